use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(quarry_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(quarry_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {0}")]
    #[diagnostic(
        code(quarry_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("Invalid configuration value: {0}")]
    #[diagnostic(
        code(quarry_config::invalid_value),
        help("page_size and max_page_size must be at least 1, and page_size must not exceed max_page_size")
    )]
    InvalidValue(String),

    #[error("Path is empty")]
    #[diagnostic(code(quarry_config::empty_path))]
    EmptyPath,

    #[error("Environment variable '{var}' not set in '{input}'")]
    #[diagnostic(
        code(quarry_config::missing_env_var),
        help("Export the variable or use an absolute path")
    )]
    MissingEnvVar { input: String, var: String },

    #[error("Unclosed variable expression starting at '{input}'")]
    #[diagnostic(code(quarry_config::unclosed_variable))]
    UnclosedVariable { input: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(quarry_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(quarry_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(quarry_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
