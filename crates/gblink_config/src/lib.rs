//! Parsing and validation of `gblink.toml` run configuration files.
//!
//! The file is optional: every section falls back to the reference
//! link-port testbench values, so [`RunConfig::default`] describes the
//! canonical 5000-step run with a two-cycle reset and a `0xCC` data byte.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    find_config, load_config, load_config_from_str, render_config, validate_config,
    CONFIG_FILE_NAME,
};
pub use types::*;
