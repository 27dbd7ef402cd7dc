//! Exit status convention
//!
//! Raw wait results never leave this module: every place that waits on a
//! child turns the result into an [`ExitCode`] here.

use nix::sys::wait::WaitStatus;

/// Normalized, non-negative exit status.
pub type ExitCode = i32;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;

/// Normalize a wait result.
///
/// Normal exits report their exit value; signal deaths report
/// `signal_base + signal`.
pub fn normalize(status: WaitStatus, signal_base: i32) -> ExitCode {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => signal_base + signal as i32,
        // Stop and continue reports need WUNTRACED/WCONTINUED, which the
        // engine never passes.
        _ => EXIT_FAILURE,
    }
}

/// Status of a two-stage pipe.
///
/// Both sides must succeed for the pipe to succeed. On disagreement the
/// consumer (right) wins, unless it alone succeeded.
pub fn combine_pipe_status(left: ExitCode, right: ExitCode) -> ExitCode {
    match (left, right) {
        (0, 0) => EXIT_SUCCESS,
        (0, right) => right,
        (left, 0) => left,
        (_, right) => right,
    }
}
