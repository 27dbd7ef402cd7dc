//! Two-stage pipes
//!
//! `left | right` runs each side in its own worker process, joined by one OS
//! pipe. Pipe ends are owned descriptors: whichever process holds a
//! [`PipeEnds`] closes both ends when it is dropped, so EOF reaches the reader
//! as soon as the writer side finishes.

use std::os::fd::{AsRawFd, OwnedFd};

use nix::unistd::pipe;
use tracing::debug;

use super::execute::evaluate;
use super::process::{install, spawn, wait_for, STDIN_FILENO, STDOUT_FILENO};
use super::status::{combine_pipe_status, ExitCode};
use super::types::ShellState;
use crate::error::ShellError;
use crate::node::CommandNode;

/// Both ends of one OS pipe.
#[derive(Debug)]
pub(crate) struct PipeEnds {
    read: OwnedFd,
    write: OwnedFd,
}

impl PipeEnds {
    pub(crate) fn new() -> Result<Self, ShellError> {
        let (read, write) = pipe().map_err(|errno| ShellError::os("pipe", errno))?;
        Ok(Self { read, write })
    }

    /// Make the write end this process's stdout and close the pipe's own descriptors.
    fn into_stdout(self) -> Result<(), ShellError> {
        let source = self.write.as_raw_fd();
        install(source, STDOUT_FILENO, [self.read, self.write])
    }

    /// Make the read end this process's stdin and close the pipe's own descriptors.
    fn into_stdin(self) -> Result<(), ShellError> {
        let source = self.read.as_raw_fd();
        install(source, STDIN_FILENO, [self.read, self.write])
    }
}

fn producer(node: Option<&CommandNode>, state: &mut ShellState, ends: PipeEnds) -> ExitCode {
    match ends.into_stdout() {
        Ok(()) => evaluate(node, state),
        Err(e) => e.into_status(),
    }
}

fn consumer(node: Option<&CommandNode>, state: &mut ShellState, ends: PipeEnds) -> ExitCode {
    match ends.into_stdin() {
        Ok(()) => evaluate(node, state),
        Err(e) => e.into_status(),
    }
}

/// Run `node.left | node.right` and combine both statuses.
pub(crate) fn pipeline(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    let ends = match PipeEnds::new() {
        Ok(ends) => ends,
        Err(e) => return e.into_status(),
    };

    let (left_pid, ends) =
        match spawn(state, ends, |state, ends| producer(node.left(), state, ends)) {
            Ok(spawned) => spawned,
            Err(e) => return e.into_status(),
        };

    let right = spawn(state, ends, |state, ends| consumer(node.right(), state, ends));

    // The parent keeps neither end open, otherwise the consumer never sees EOF.
    let right_pid = match right {
        Ok((pid, ends)) => {
            drop(ends);
            pid
        }
        Err(e) => {
            if let Err(wait_err) = wait_for(left_pid, state) {
                wait_err.report();
            }
            return e.into_status();
        }
    };
    debug!(left = %left_pid, right = %right_pid, "pipeline.spawned");

    let left_status = wait_for(left_pid, state).unwrap_or_else(ShellError::into_status);
    let right_status = wait_for(right_pid, state).unwrap_or_else(ShellError::into_status);

    combine_pipe_status(left_status, right_status)
}
