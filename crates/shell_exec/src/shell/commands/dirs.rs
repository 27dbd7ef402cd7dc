//! Pushd and popd command implementations
//!
//! Both print the new working directory followed by the stack, top to
//! bottom, space separated:
//!
//! ```text
//! /new/cwd /previous /older
//! ```

use std::env;
use std::io::Write;

use super::{finish, output_for, ShellCommand};
use crate::error::ShellError;
use crate::node::CommandNode;
use crate::shell::status::ExitCode;
use crate::shell::types::{DirStack, ShellState};

/// The `pushd` command - saves the current directory and changes to a new one.
pub struct PushdCommand;

impl ShellCommand for PushdCommand {
    fn execute(&self, node: &CommandNode, state: &mut ShellState) -> ExitCode {
        finish("pushd", pushd(node, state))
    }
}

/// The `popd` command - returns to the directory on top of the stack.
pub struct PopdCommand;

impl ShellCommand for PopdCommand {
    fn execute(&self, node: &CommandNode, state: &mut ShellState) -> ExitCode {
        finish("popd", popd(node, state))
    }
}

fn pushd(node: &CommandNode, state: &mut ShellState) -> Result<(), ShellError> {
    let [_, target] = node.argv.as_slice() else {
        return Err(ShellError::usage("pushd: exactly one argument required"));
    };

    let previous = env::current_dir().map_err(|e| ShellError::io("pushd: getcwd", e))?;
    let mut out = output_for(node)?;

    env::set_current_dir(target).map_err(|e| ShellError::io(format!("pushd: {target}"), e))?;
    state.dir_stack_mut().push(previous);

    write_listing(&mut out, state.dir_stack())
}

fn popd(node: &CommandNode, state: &mut ShellState) -> Result<(), ShellError> {
    if node.argv.len() != 1 {
        return Err(ShellError::usage("popd: no arguments allowed"));
    }
    let Some(top) = state.dir_stack().top().map(|dir| dir.to_path_buf()) else {
        return Err(ShellError::usage("popd: directory stack empty"));
    };

    let mut out = output_for(node)?;

    // The entry stays on the stack if the change fails.
    env::set_current_dir(&top)
        .map_err(|e| ShellError::io(format!("popd: {}", top.display()), e))?;
    state.dir_stack_mut().pop();

    write_listing(&mut out, state.dir_stack())
}

fn write_listing(out: &mut dyn Write, stack: &DirStack) -> Result<(), ShellError> {
    let mut line = match env::current_dir() {
        Ok(cwd) => cwd.display().to_string(),
        Err(_) => String::new(),
    };
    for dir in stack.iter() {
        line.push(' ');
        line.push_str(&dir.display().to_string());
    }
    line.push('\n');

    out.write_all(line.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| ShellError::io("write", e))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::node::OutputRedirect;
    use crate::test_support::{detached_state, lock, read, CwdGuard};

    fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap();
        (dir, path)
    }

    fn arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_pushd_argument_count() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let before = env::current_dir().unwrap();

        assert_eq!(PushdCommand.execute(&CommandNode::simple(["pushd"]), &mut state), 1);
        assert_eq!(
            PushdCommand.execute(&CommandNode::simple(["pushd", "/", "/tmp"]), &mut state),
            1
        );
        assert!(state.dir_stack().is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_pushd_missing_target_leaves_stack() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let (_dir, root) = canonical_tempdir();
        let before = env::current_dir().unwrap();

        let node = CommandNode::simple(["pushd", arg(&root.join("nope"))]);
        assert_ne!(PushdCommand.execute(&node, &mut state), 0);
        assert!(state.dir_stack().is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_popd_empty_stack() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let before = env::current_dir().unwrap();

        assert_eq!(PopdCommand.execute(&CommandNode::simple(["popd"]), &mut state), 1);
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_popd_rejects_arguments() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        state.dir_stack_mut().push(PathBuf::from("/"));

        assert_eq!(
            PopdCommand.execute(&CommandNode::simple(["popd", "/"]), &mut state),
            1
        );
        assert_eq!(state.dir_stack().len(), 1);
    }

    #[test]
    fn test_pushd_then_popd_restores() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let (_dir, target) = canonical_tempdir();
        let (_log_dir, log_root) = canonical_tempdir();
        let before = env::current_dir().unwrap();
        let stack_before = state.dir_stack().clone();

        let push_out = log_root.join("push.txt");
        let push = CommandNode::simple(["pushd", arg(&target)])
            .with_output(OutputRedirect::Truncate(push_out.clone()));
        assert_eq!(PushdCommand.execute(&push, &mut state), 0);
        assert_eq!(env::current_dir().unwrap(), target);
        assert_eq!(state.dir_stack().top(), Some(before.as_path()));
        assert_eq!(
            read(&push_out),
            format!("{} {}\n", target.display(), before.display())
        );

        let pop_out = log_root.join("pop.txt");
        let pop = CommandNode::simple(["popd"]).with_output(OutputRedirect::Truncate(pop_out.clone()));
        assert_eq!(PopdCommand.execute(&pop, &mut state), 0);
        assert_eq!(env::current_dir().unwrap(), before);
        assert_eq!(state.dir_stack(), &stack_before);
        assert_eq!(read(&pop_out), format!("{}\n", before.display()));
    }

    #[test]
    fn test_listing_shows_whole_stack() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let (_a_dir, a) = canonical_tempdir();
        let (_b_dir, b) = canonical_tempdir();
        let (_log_dir, log_root) = canonical_tempdir();
        let start = env::current_dir().unwrap();
        let out = log_root.join("dirs.txt");

        let first = CommandNode::simple(["pushd", arg(&a)])
            .with_output(OutputRedirect::Truncate(log_root.join("first.txt")));
        let second = CommandNode::simple(["pushd", arg(&b)])
            .with_output(OutputRedirect::Append(out.clone()));
        let pop = CommandNode::simple(["popd"]).with_output(OutputRedirect::Append(out.clone()));

        assert_eq!(PushdCommand.execute(&first, &mut state), 0);
        assert_eq!(PushdCommand.execute(&second, &mut state), 0);
        assert_eq!(PopdCommand.execute(&pop, &mut state), 0);

        assert_eq!(
            read(&out),
            format!(
                "{b} {a} {start}\n{a} {start}\n",
                a = a.display(),
                b = b.display(),
                start = start.display()
            )
        );
    }

    #[test]
    fn test_popd_into_removed_directory_keeps_entry() {
        let _lock = lock();
        let _cwd = CwdGuard::new();
        let mut state = detached_state();
        let (dir, _) = canonical_tempdir();
        let gone = dir.path().join("gone");
        state.dir_stack_mut().push(gone);

        assert_ne!(PopdCommand.execute(&CommandNode::simple(["popd"]), &mut state), 0);
        assert_eq!(state.dir_stack().len(), 1);
    }
}
