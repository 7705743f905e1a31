pub mod annotations;
pub mod config;
pub mod error;
pub mod paths;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::{ConfigError, Result};
