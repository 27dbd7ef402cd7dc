//! Line-oriented command tree input
//!
//! One JSON document per line; `null` is an absent tree.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use shell_exec::{evaluate, CommandNode, ExitCode, ShellState, EXIT_SUCCESS};

/// Status for a line that does not decode to a command tree.
pub const INVALID_TREE: ExitCode = 2;

/// Evaluate every tree in `reader`, returning the last status.
pub fn run(reader: impl BufRead, state: &mut ShellState) -> Result<ExitCode> {
    let mut status = EXIT_SUCCESS;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("reading command input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        status = match serde_json::from_str::<Option<CommandNode>>(line) {
            Ok(tree) => evaluate(tree.as_ref(), state),
            Err(e) => {
                let _ = writeln!(
                    io::stderr(),
                    "fsh: line {}: invalid command tree: {}",
                    index + 1,
                    e
                );
                state.record_status(INVALID_TREE);
                INVALID_TREE
            }
        };
    }

    Ok(status)
}
