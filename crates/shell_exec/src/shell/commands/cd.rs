//! Cd command implementation
//!
//! Changes the shell's working directory. No directory stack interaction.

use nix::errno::Errno;

use super::{finish, ShellCommand};
use crate::error::ShellError;
use crate::node::{CommandNode, OutputRedirect};
use crate::shell::process::open_output;
use crate::shell::status::ExitCode;
use crate::shell::types::ShellState;

/// The `cd` command - changes the current working directory.
pub struct CdCommand;

impl ShellCommand for CdCommand {
    fn execute(&self, node: &CommandNode, state: &mut ShellState) -> ExitCode {
        finish("cd", change_directory(node, state))
    }
}

fn change_directory(node: &CommandNode, state: &ShellState) -> Result<(), ShellError> {
    if node.argv.len() > 2 {
        return Err(ShellError::usage("cd: too many arguments"));
    }

    let target = match node.argv.get(1) {
        None => {
            let home_var = &state.config().home_var;
            state
                .vars()
                .get(home_var)
                .ok_or_else(|| ShellError::os(format!("cd: {home_var} not set"), Errno::ENOENT))?
        }
        Some(path) if path.is_empty() => {
            return Err(ShellError::usage("cd: empty pathname not allowed"));
        }
        Some(path) => path.clone(),
    };

    // Only a truncating redirect is honored: the file is emptied and
    // closed, nothing is written to it.
    if let OutputRedirect::Truncate(path) = &node.output_redirect {
        drop(open_output(path, false)?);
    }

    std::env::set_current_dir(&target).map_err(|e| ShellError::io(format!("cd: {target}"), e))
}
