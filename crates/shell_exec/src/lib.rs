//! Execution engine for a POSIX-style command shell
//!
//! Takes an already-parsed [`CommandNode`] tree and runs it against the
//! operating system:
//! - Launching external programs with file and heredoc redirections
//! - Two-stage pipes between sub-trees
//! - `&&`, `||`, `;` sequencing, `&` backgrounding and `( ... )` subshells
//! - Opportunistic reaping of finished background children
//! - The `cd`, `pushd` and `popd` built-ins backed by a directory stack
//!
//! Concurrency comes from OS process duplication only: the evaluator itself is
//! synchronous and single-threaded. All long-lived state (directory stack,
//! last exit status) is held by a [`ShellState`] context owned by the caller.
//!
//! ```no_run
//! use shell_exec::{evaluate, CommandNode, ShellConfig, ShellState};
//!
//! let mut state = ShellState::new(ShellConfig::default());
//! let tree = CommandNode::and(
//!     CommandNode::simple(["true"]),
//!     CommandNode::simple(["echo", "ok"]),
//! );
//! let status = evaluate(Some(&tree), &mut state);
//! assert_eq!(status, 0);
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ShellConfig;
pub use error::ShellError;
pub use node::{CommandNode, InputRedirect, NodeKind, OutputRedirect};
pub use shell::{
    evaluate, reap_zombies,
    commands::{builtin_commands, ShellCommand},
    status::{combine_pipe_status, normalize, ExitCode, EXIT_FAILURE, EXIT_SUCCESS},
    types::{DirStack, ProcessEnv, ShellState, VarStore},
};
