//! Loading `ShellConfig` from TOML

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use shell_exec::ShellConfig;

/// Load the config file, or the defaults when no file was given.
pub fn load(path: Option<&Path>) -> Result<ShellConfig> {
    let Some(path) = path else {
        return Ok(ShellConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing config at {}", path.display()))
}

pub fn parse(text: &str) -> Result<ShellConfig> {
    Ok(toml::from_str(text)?)
}
