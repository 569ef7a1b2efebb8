//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `gblink.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The configuration could not be rendered back to TOML.
    #[error("failed to render configuration: {0}")]
    SerializeError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn empty_trace_path_names_the_field() {
        let err = load_config_from_str("[trace]\npath = \"  \"\n").unwrap_err();
        assert_eq!(err.to_string(), "missing required field: trace.path");
    }

    #[test]
    fn wide_stimulus_value_message() {
        let err = load_config_from_str("[stimulus]\nrst = 3\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: stimulus.rst = 0x3 does not fit the pin (max 0x1)"
        );
    }

    #[test]
    fn toml_syntax_error_is_wrapped() {
        let err = load_config_from_str("[model]\nserial_half_period = \n").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to parse configuration:"));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = load_config_from_str("[run]\nsteps = \"many\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(ref m) if m.contains("steps")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gblink.toml");
        let err: ConfigError = io_err.into();
        assert_eq!(
            err.to_string(),
            "failed to read configuration: gblink.toml"
        );
    }

    #[test]
    fn render_failure_message() {
        let err = ConfigError::SerializeError("unsupported None value".to_string());
        assert_eq!(
            err.to_string(),
            "failed to render configuration: unsupported None value"
        );
    }
}
