//! Built-in shell commands
//!
//! This module provides:
//! - `ShellCommand` trait for implementing commands
//! - Built-in commands: cd, pushd, popd
//! - `builtin_commands()` function to get all built-in commands
//!
//! Built-ins run synchronously inside the shell process and never fork:
//! changing the shell's working directory from a child would be lost.

mod cd;
mod dirs;

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use super::process::open_output;
use super::status::{ExitCode, EXIT_SUCCESS};
use super::types::ShellState;
use crate::error::ShellError;
use crate::node::{CommandNode, OutputRedirect};

pub use cd::CdCommand;
pub use dirs::{PopdCommand, PushdCommand};

/// Trait for implementing shell commands.
pub trait ShellCommand {
    /// Run the command for `node` against the shell's own state.
    fn execute(&self, node: &CommandNode, state: &mut ShellState) -> ExitCode;
}

/// Map a built-in's result to its exit status, reporting failures.
fn finish(name: &str, result: Result<(), ShellError>) -> ExitCode {
    match result {
        Ok(()) => {
            tracing::debug!(builtin = name, "builtin.ok");
            EXIT_SUCCESS
        }
        Err(e) => e.into_status(),
    }
}

/// Where a built-in writes: stdout, or the node's output redirect.
fn output_for(node: &CommandNode) -> Result<Box<dyn Write>, ShellError> {
    Ok(match &node.output_redirect {
        OutputRedirect::None => Box::new(io::stdout()),
        OutputRedirect::Truncate(path) => Box::new(open_output(path, false)?),
        OutputRedirect::Append(path) => Box::new(open_output(path, true)?),
    })
}

/// Get all built-in commands as a HashMap.
pub fn builtin_commands() -> HashMap<String, Rc<dyn ShellCommand>> {
    let mut commands: HashMap<String, Rc<dyn ShellCommand>> = HashMap::new();

    commands.insert("cd".to_string(), Rc::new(CdCommand));
    commands.insert("pushd".to_string(), Rc::new(PushdCommand));
    commands.insert("popd".to_string(), Rc::new(PopdCommand));

    commands
}
