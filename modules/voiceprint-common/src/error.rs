use thiserror::Error;

/// Startup configuration failure. Fatal for normal operation: the server
/// falls back to setup mode and serves only setup instructions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

