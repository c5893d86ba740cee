//! Ephemera host — error types.

use thiserror::Error;

/// Startup and runtime errors for the terminal host.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_converts() {
        let err: AppError = serde_yaml::from_str::<u32>("not a number").unwrap_err().into();
        assert!(matches!(err, AppError::Yaml(_)));
        assert!(err.to_string().starts_with("yaml error:"));
    }

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("EPHEMERA_FRAME_MS must be positive".into());
        assert_eq!(
            err.to_string(),
            "configuration error: EPHEMERA_FRAME_MS must be positive"
        );
    }
}
