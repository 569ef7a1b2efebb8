//! Configuration file loading and validation.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::RunConfig;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "gblink.toml";

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// An empty string yields the default configuration.
pub fn load_config_from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Returns `<dir>/gblink.toml` if it exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Renders a configuration as TOML text.
pub fn render_config(config: &RunConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
}

/// Checks ranges and cross-field consistency.
///
/// Called by the loaders; callers that modify a loaded configuration should
/// call it again.
pub fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.run.steps == 0 {
        return Err(ConfigError::ValidationError(
            "run.steps must be non-zero".to_string(),
        ));
    }
    if config.run.reset_cycles > config.run.steps {
        return Err(ConfigError::ValidationError(format!(
            "run.reset_cycles ({}) exceeds run.steps ({})",
            config.run.reset_cycles, config.run.steps
        )));
    }
    if config.trace.path.trim().is_empty() {
        return Err(ConfigError::MissingField("trace.path".to_string()));
    }
    if config.trace.depth == 0 {
        return Err(ConfigError::ValidationError(
            "trace.depth must be non-zero".to_string(),
        ));
    }
    if config.trace.timescale.trim().is_empty() {
        return Err(ConfigError::MissingField("trace.timescale".to_string()));
    }
    if config.model.serial_half_period == 0 {
        return Err(ConfigError::ValidationError(
            "model.serial_half_period must be non-zero".to_string(),
        ));
    }
    if config.model.finish_after_transfers == Some(0) {
        return Err(ConfigError::ValidationError(
            "model.finish_after_transfers must be non-zero".to_string(),
        ));
    }

    for (name, value) in config.stimulus.entries() {
        let max = if name == "sb_in" { 0xFF } else { 1 };
        if value > max {
            return Err(ConfigError::ValidationError(format!(
                "stimulus.{name} = {value:#x} does not fit the pin (max {max:#x})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_config_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[run]
steps = 100
reset_cycles = 4
select_step = 5
enable_step = 6

[trace]
enabled = false
path = "out/run.vcd"
depth = 1
timescale = "10ns"
compress = true

[stimulus]
sb_in = 0x5A
serial_data_in = 1

[model]
serial_half_period = 4
finish_after_transfers = 2
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.run.steps, 100);
        assert_eq!(config.run.reset_cycles, 4);
        assert_eq!(config.run.select_step, 5);
        assert_eq!(config.run.enable_step, 6);
        assert!(!config.trace.enabled);
        assert_eq!(config.trace.path, "out/run.vcd");
        assert_eq!(config.trace.depth, 1);
        assert_eq!(config.trace.timescale, "10ns");
        assert!(config.trace.compress);
        assert_eq!(config.stimulus.sb_in, 0x5A);
        assert_eq!(config.stimulus.serial_data_in, 1);
        // Unspecified stimulus fields keep their power-on defaults.
        assert_eq!(config.stimulus.clk, 1);
        assert_eq!(config.stimulus.cpu_wr_n, 1);
        assert_eq!(config.model.serial_half_period, 4);
        assert_eq!(config.model.finish_after_transfers, Some(2));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config = load_config_from_str("[run]\nsteps = 10\n").unwrap();
        assert_eq!(config.run.steps, 10);
        assert_eq!(config.run.reset_cycles, 2);
        assert_eq!(config.trace.path, "link.vcd");
    }

    #[test]
    fn reject_zero_steps() {
        let err = load_config_from_str("[run]\nsteps = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn reject_reset_longer_than_run() {
        let err = load_config_from_str("[run]\nsteps = 3\nreset_cycles = 4\n").unwrap_err();
        assert!(err.to_string().contains("reset_cycles"));
    }

    #[test]
    fn reject_wide_sb_in() {
        let err = load_config_from_str("[stimulus]\nsb_in = 0x1FF\n").unwrap_err();
        assert!(err.to_string().contains("stimulus.sb_in"));
    }

    #[test]
    fn reject_multibit_single_pin() {
        let err = load_config_from_str("[stimulus]\nclk = 2\n").unwrap_err();
        assert!(err.to_string().contains("stimulus.clk"));
    }

    #[test]
    fn reject_empty_trace_path() {
        let err = load_config_from_str("[trace]\npath = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "trace.path"));
    }

    #[test]
    fn reject_zero_depth() {
        let err = load_config_from_str("[trace]\ndepth = 0\n").unwrap_err();
        assert!(err.to_string().contains("trace.depth"));
    }

    #[test]
    fn reject_zero_half_period() {
        let err = load_config_from_str("[model]\nserial_half_period = 0\n").unwrap_err();
        assert!(err.to_string().contains("serial_half_period"));
    }

    #[test]
    fn reject_finish_after_zero_transfers() {
        let err = load_config_from_str("[model]\nfinish_after_transfers = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("finish_after_transfers"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = load_config_from_str("[run\nsteps = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn render_then_load_preserves_values() {
        let mut config = RunConfig::default();
        config.run.steps = 42;
        config.model.finish_after_transfers = Some(1);
        let text = render_config(&config).unwrap();
        assert_eq!(load_config_from_str(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[run]\nsteps = 7\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.run.steps, 7);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(find_config(tmp.path()).is_none());
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            find_config(tmp.path()),
            Some(tmp.path().join(CONFIG_FILE_NAME))
        );
    }
}
