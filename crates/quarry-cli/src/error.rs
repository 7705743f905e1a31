use miette::Diagnostic;
use quarry_config::ConfigError;
use quarry_db::DbError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("Invalid {kind} '{input}': {reason}")]
    #[diagnostic(
        code(quarry::argument),
        help("Conditions are `column:operator[:value]`, orders `column[:asc|desc]`, assignments `column=value`")
    )]
    Argument {
        kind: &'static str,
        input: String,
        reason: String,
    },

    #[error("Error while {action}")]
    #[diagnostic(code(quarry::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(quarry::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn argument(kind: &'static str, input: &str, reason: impl Into<String>) -> Self {
        Self::Argument {
            kind,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;
