//! Engine configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunables for a [`ShellState`](crate::ShellState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Environment name carrying the last normalized exit status.
    pub status_var: String,
    /// A process killed by signal `n` reports `signal_status_base + n`.
    pub signal_status_base: i32,
    /// Where heredoc backing stores are created. `None` uses the system
    /// temp directory.
    pub heredoc_dir: Option<PathBuf>,
    /// Variable consulted by `cd` with no arguments.
    pub home_var: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            status_var: "?".to_string(),
            signal_status_base: 128,
            heredoc_dir: None,
            home_var: "HOME".to_string(),
        }
    }
}
