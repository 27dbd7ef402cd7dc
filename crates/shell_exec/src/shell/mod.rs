//! Shell execution engine
//!
//! This module provides the core shell execution functionality:
//! - `types` - Long-lived state (ShellState, DirStack, VarStore)
//! - `status` - Exit status normalization
//! - `execute` - Dispatcher, sequencing, background, reaping
//! - `process` - Fork/exec, redirections, subshells
//! - `pipeline` - Two-stage pipes
//! - `commands` - Built-in shell commands

pub mod commands;
pub mod execute;
mod pipeline;
mod process;
pub mod status;
pub mod types;

// Re-export main execution functions
pub use execute::{evaluate, reap_zombies};

// Re-export types
pub use status::{ExitCode, EXIT_FAILURE, EXIT_SUCCESS};
pub use types::{DirStack, ProcessEnv, ShellState, VarStore};

// Re-export command types
pub use commands::{builtin_commands, ShellCommand};
