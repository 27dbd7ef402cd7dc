//! Shell execution engine
//!
//! Evaluates a command tree node by node. Every entry reaps finished
//! background children first, then either runs a built-in in this process or
//! dispatches on the node type. The resulting status is recorded into the
//! last-status register before it is returned.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::debug;

use super::pipeline::pipeline;
use super::process::{launch, spawn, subshell};
use super::status::{normalize, ExitCode, EXIT_SUCCESS};
use super::types::ShellState;
use crate::node::{CommandNode, NodeKind};

// ============================================================================
// Public API
// ============================================================================

/// Evaluate a command tree and return its normalized exit status.
///
/// An absent tree is a no-op success (after reaping).
pub fn evaluate(node: Option<&CommandNode>, state: &mut ShellState) -> ExitCode {
    reap_zombies(state);

    let Some(node) = node else {
        return EXIT_SUCCESS;
    };

    let status = match state.resolve_builtin(node) {
        Some(builtin) => builtin.execute(node, state),
        None => match node.kind {
            NodeKind::Simple => launch(node, state),
            NodeKind::Pipe => pipeline(node, state),
            NodeKind::And => execute_and(node, state),
            NodeKind::Or => execute_or(node, state),
            NodeKind::Sequence => execute_sequence(node, state),
            NodeKind::Background => background(node, state),
            NodeKind::Subshell => subshell(node, state),
        },
    };

    state.record_status(status);
    status
}

/// Reclaim every background child that has already finished, without
/// blocking. Each one is announced as a job notice.
pub fn reap_zombies(state: &mut ShellState) -> Vec<(Pid, ExitCode)> {
    let mut reaped = Vec::new();

    loop {
        match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                let Some(pid) = status.pid() else { break };
                let code = normalize(status, state.config().signal_status_base);
                debug!(pid = %pid, status = code, "process.reaped");
                state.notify(format_args!("Completed: {} ({})", pid, code));
                reaped.push((pid, code));
            }
            Err(Errno::EINTR) => continue,
            // ECHILD: nothing left to wait for.
            Err(_) => break,
        }
    }

    reaped
}

// ============================================================================
// Sequencing (&&, ||, ;)
// ============================================================================

fn execute_and(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    let left = evaluate(node.left(), state);
    if left == EXIT_SUCCESS {
        evaluate(node.right(), state)
    } else {
        left
    }
}

fn execute_or(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    let left = evaluate(node.left(), state);
    if left != EXIT_SUCCESS {
        evaluate(node.right(), state)
    } else {
        left
    }
}

fn execute_sequence(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    let mut status = evaluate(node.left(), state);
    state.record_status(status);

    if let Some(right) = node.right() {
        status = evaluate(Some(right), state);
        state.record_status(status);
    }

    status
}

// ============================================================================
// Background (&)
// ============================================================================

/// Run `node` in background mode.
///
/// Structural nodes do not fork: a `Background` list detaches both sides,
/// and a `Sequence` runs its head in the foreground and detaches the rest.
/// Anything else is detached as one process.
fn background(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    match node.kind {
        NodeKind::Background => {
            let mut status = node.left().map_or(EXIT_SUCCESS, |left| background(left, state));
            if let Some(right) = node.right() {
                let right_status = background(right, state);
                if status == EXIT_SUCCESS {
                    status = right_status;
                }
            }
            status
        }
        NodeKind::Sequence => {
            evaluate(node.left(), state);
            node.right().map_or(EXIT_SUCCESS, |right| background(right, state))
        }
        _ => detach(node, state),
    }
}

/// Fork a process that evaluates `node`; do not wait for it.
fn detach(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    match spawn(state, (), |state, ()| evaluate(Some(node), state)) {
        Ok((pid, ())) => {
            debug!(pid = %pid, "process.background");
            state.notify(format_args!("Backgrounded: {}", pid));
            state.set_last_background(pid);
            state.record_status(EXIT_SUCCESS);
            EXIT_SUCCESS
        }
        Err(e) => e.into_status(),
    }
}

// ============================================================================
// Tests
// ============================================================================
