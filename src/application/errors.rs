//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("{integration} request failed: {detail}")]
    Upstream {
        integration: &'static str,
        detail: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    pub fn upstream(integration: &'static str, detail: impl ToString) -> Self {
        BotError::Upstream {
            integration,
            detail: detail.to_string(),
        }
    }
}

/// Command registration and dispatch errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command already registered: {0}")]
    Duplicate(String),

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid value {token:?} for argument {param}")]
    InvalidArgumentType { param: String, token: String },
}

/// Record formatting errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Record is missing required field: {0}")]
    MalformedRecord(&'static str),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for field: {0}")]
    Invalid(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
