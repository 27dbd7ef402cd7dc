//! Process creation and child-side setup
//!
//! Every forked child in the engine goes through [`spawn`]. The child never
//! returns into the caller's control flow: it runs its closure and exits with
//! the resulting status.

use std::convert::Infallible;
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{dup2, execvp, fork, ForkResult, Pid};
use tracing::debug;

use super::execute::evaluate;
use super::status::{normalize, ExitCode};
use super::types::{ProcessEnv, ShellState, VarStore};
use crate::error::ShellError;
use crate::node::{CommandNode, InputRedirect, OutputRedirect};

pub(crate) const STDIN_FILENO: RawFd = 0;
pub(crate) const STDOUT_FILENO: RawFd = 1;

// ============================================================================
// Fork / Wait
// ============================================================================

/// Fork a child that runs `child` and exits with its status.
///
/// `carry` is handed to the child by value and returned to the parent, so
/// resources the child must release (pipe ends) are dropped on both sides.
pub(crate) fn spawn<T, F>(
    state: &mut ShellState,
    carry: T,
    child: F,
) -> Result<(Pid, T), ShellError>
where
    F: FnOnce(&mut ShellState, T) -> ExitCode,
{
    // SAFETY: the evaluator is single-threaded; the child only runs engine
    // code and then exits without returning to the caller.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = %child, "process.fork");
            Ok((child, carry))
        }
        Ok(ForkResult::Child) => {
            let status = child(state, carry);
            exit_child(status)
        }
        Err(errno) => Err(ShellError::os("fork", errno)),
    }
}

/// Terminate a forked child. std flushes stdout on the way out.
pub(crate) fn exit_child(status: ExitCode) -> ! {
    std::process::exit(status)
}

/// Block until `pid` terminates and normalize its status.
pub(crate) fn wait_for(pid: Pid, state: &ShellState) -> Result<ExitCode, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                let code = normalize(status, state.config().signal_status_base);
                debug!(pid = %pid, status = code, "process.wait");
                return Ok(code);
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ShellError::os("waitpid", errno)),
        }
    }
}

// ============================================================================
// Child-side Setup
// ============================================================================

/// Make `source` the descriptor `target`, then close every descriptor in
/// `owned` except one that already is `target`.
///
/// When a standard stream was closed before the open, the new descriptor
/// lands on `target` itself; closing it would close the stream.
pub(crate) fn install(
    source: RawFd,
    target: RawFd,
    owned: impl IntoIterator<Item = OwnedFd>,
) -> Result<(), ShellError> {
    if source != target {
        dup2(source, target).map_err(|errno| ShellError::os("dup2", errno))?;
    }
    for fd in owned {
        if fd.as_raw_fd() == target {
            let _ = fd.into_raw_fd();
        }
    }
    Ok(())
}

/// Replace `target` with `file` in this process's descriptor table.
fn replace_stdio(file: File, target: RawFd) -> Result<(), ShellError> {
    let fd = OwnedFd::from(file);
    install(fd.as_raw_fd(), target, [fd])
}

/// Open an output redirect target with mode 0644.
pub(crate) fn open_output(path: &Path, append: bool) -> Result<File, ShellError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(0o644);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options
        .open(path)
        .map_err(|e| ShellError::io(format!("open {}", path.display()), e))
}

/// Write `text` into an unlinked temporary file and rewind it.
fn heredoc_store(text: &str, state: &ShellState) -> Result<File, ShellError> {
    let store = match &state.config().heredoc_dir {
        Some(dir) => tempfile::tempfile_in(dir),
        None => tempfile::tempfile(),
    };
    let mut store = store.map_err(|e| ShellError::io("heredoc", e))?;
    store
        .write_all(text.as_bytes())
        .and_then(|_| store.seek(SeekFrom::Start(0)))
        .map_err(|e| ShellError::io("heredoc", e))?;
    Ok(store)
}

/// Apply a node's bindings and redirections to the current (child) process,
/// in order: bindings, output, input.
///
/// Bindings always go into the process environment, whatever the state's
/// store is, so the program exec'd next inherits them.
pub(crate) fn prepare_child(node: &CommandNode, state: &mut ShellState) -> Result<(), ShellError> {
    for (name, value) in &node.local_bindings {
        ProcessEnv.put(name, value);
        state.vars_mut().put(name, value);
    }

    match &node.output_redirect {
        OutputRedirect::None => {}
        OutputRedirect::Truncate(path) => replace_stdio(open_output(path, false)?, STDOUT_FILENO)?,
        OutputRedirect::Append(path) => replace_stdio(open_output(path, true)?, STDOUT_FILENO)?,
    }

    match &node.input_redirect {
        InputRedirect::None => {}
        InputRedirect::File(path) => {
            let file = File::open(path)
                .map_err(|e| ShellError::io(format!("open {}", path.display()), e))?;
            replace_stdio(file, STDIN_FILENO)?;
        }
        InputRedirect::Heredoc(text) => replace_stdio(heredoc_store(text, state)?, STDIN_FILENO)?,
    }

    Ok(())
}

fn exec_program(node: &CommandNode, state: &mut ShellState) -> Result<Infallible, ShellError> {
    prepare_child(node, state)?;

    let argv = node
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ShellError::os("execvp", Errno::EINVAL))?;
    let program = argv
        .first()
        .ok_or_else(|| ShellError::usage("empty command"))?;

    execvp(program, &argv).map_err(|errno| ShellError::os(node.argv[0].as_str(), errno))
}

// ============================================================================
// Simple Commands
// ============================================================================

/// Run one external program and wait for it.
pub(crate) fn launch(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    if node.argv.is_empty() {
        return ShellError::usage("empty command").into_status();
    }
    debug!(program = %node.argv[0], args = ?&node.argv[1..], "process.launch");

    let spawned = spawn(state, (), |state, ()| match exec_program(node, state) {
        Ok(never) => match never {},
        Err(e) => e.into_status(),
    });

    match spawned.and_then(|(pid, ())| wait_for(pid, state)) {
        Ok(status) => status,
        Err(e) => e.into_status(),
    }
}

// ============================================================================
// Subshells
// ============================================================================

/// Evaluate the parenthesized sub-tree in a child process and wait for it.
pub(crate) fn subshell(node: &CommandNode, state: &mut ShellState) -> ExitCode {
    let spawned = spawn(state, (), |state, ()| match prepare_child(node, state) {
        Ok(()) => evaluate(node.left(), state),
        Err(e) => e.into_status(),
    });

    match spawned.and_then(|(pid, ())| wait_for(pid, state)) {
        Ok(status) => status,
        Err(e) => e.into_status(),
    }
}
