//! `gblink init`: write a default `gblink.toml`.
//!
//! The file lists every configurable field at its built-in value, so a run
//! with the generated file behaves exactly like a run with no file at all.

use std::fs;
use std::path::{Path, PathBuf};

use gblink_config::{render_config, RunConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Runs the `gblink init` command.
///
/// Writes into `dir` (created if missing) or the current directory. Refuses to
/// replace an existing file unless `force` is set. Returns exit code 0 on success.
pub fn run(
    dir: Option<String>,
    force: bool,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let target_dir = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    let path = write_default_config(&target_dir, force)?;
    if !global.quiet {
        eprintln!("     Created {}", path.display());
    }
    Ok(0)
}

fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    fs::create_dir_all(dir)?;
    fs::write(&path, render_config(&RunConfig::default())?)?;
    tracing::debug!(path = %path.display(), "wrote default configuration");
    Ok(path)
}
