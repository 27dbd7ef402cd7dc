//! Core types for shell execution
//!
//! This module provides the long-lived state threaded through evaluation:
//! - `ShellState` - Directory stack, last status, variables, built-ins
//! - `DirStack` - LIFO of directories backing `pushd`/`popd`
//! - `VarStore` - Mapping collaborator for variables (put/get/remove)
//! - `ProcessEnv` - `VarStore` backed by the process environment

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use nix::unistd::Pid;

use super::commands::{builtin_commands, ShellCommand};
use super::status::{ExitCode, EXIT_SUCCESS};
use crate::config::ShellConfig;
use crate::node::CommandNode;

// ============================================================================
// Variable Store
// ============================================================================

/// String-keyed variable mapping.
///
/// Writes made through the store in a forked child stay in that child.
pub trait VarStore {
    fn put(&mut self, name: &str, value: &str);
    fn get(&self, name: &str) -> Option<String>;
    fn remove(&mut self, name: &str);
}

/// The process environment, inherited by every program this process execs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarStore for ProcessEnv {
    fn put(&mut self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn remove(&mut self, name: &str) {
        std::env::remove_var(name);
    }
}

/// Detached variables. Nothing written here reaches exec'd programs.
impl VarStore for HashMap<String, String> {
    fn put(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }

    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }

    fn remove(&mut self, name: &str) {
        HashMap::remove(self, name);
    }
}

// ============================================================================
// Directory Stack
// ============================================================================

/// Directories saved by `pushd`, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirStack {
    entries: Vec<PathBuf>,
}

impl DirStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dir: PathBuf) {
        self.entries.push(dir);
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&Path> {
        self.entries.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().rev().map(PathBuf::as_path)
    }
}

// ============================================================================
// Shell State
// ============================================================================

/// Context object for evaluation.
///
/// Holds the state that must outlive a single command line: the directory
/// stack, the last-status register, and the variable store. Only the shell
/// process itself mutates it; a forked child works on its own copy.
///
/// Job notices (`Backgrounded: <pid>`, `Completed: <pid> (<status>)`) go to
/// stderr unless another writer is installed with
/// [`with_notices`](Self::with_notices).
pub struct ShellState {
    config: ShellConfig,
    dir_stack: DirStack,
    last_status: ExitCode,
    last_background: Option<Pid>,
    vars: Box<dyn VarStore>,
    notices: Box<dyn Write>,
    commands: Rc<HashMap<String, Rc<dyn ShellCommand>>>,
}

impl ShellState {
    /// State whose variables live in the process environment.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_vars(config, Box::new(ProcessEnv))
    }

    pub fn with_vars(config: ShellConfig, vars: Box<dyn VarStore>) -> Self {
        Self {
            config,
            dir_stack: DirStack::new(),
            last_status: EXIT_SUCCESS,
            last_background: None,
            vars,
            notices: Box::new(io::stderr()),
            commands: Rc::new(builtin_commands()),
        }
    }

    /// Send job notices to `out` instead of stderr.
    pub fn with_notices(mut self, out: Box<dyn Write>) -> Self {
        self.notices = out;
        self
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn dir_stack(&self) -> &DirStack {
        &self.dir_stack
    }

    pub fn dir_stack_mut(&mut self) -> &mut DirStack {
        &mut self.dir_stack
    }

    pub fn vars(&self) -> &dyn VarStore {
        self.vars.as_ref()
    }

    pub fn vars_mut(&mut self) -> &mut dyn VarStore {
        self.vars.as_mut()
    }

    /// Last status written by [`record_status`](Self::record_status).
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Update the last-status register and publish it under `status_var`.
    pub fn record_status(&mut self, status: ExitCode) {
        self.last_status = status;
        let name = self.config.status_var.clone();
        self.vars.put(&name, &status.to_string());
    }

    /// Pid of the most recently backgrounded process.
    pub fn last_background(&self) -> Option<Pid> {
        self.last_background
    }

    pub(crate) fn set_last_background(&mut self, pid: Pid) {
        self.last_background = Some(pid);
    }

    /// Write one job notice line. Failures to write are ignored.
    pub(crate) fn notify(&mut self, line: fmt::Arguments<'_>) {
        let out = &mut self.notices;
        if out.write_fmt(line).is_ok() && out.write_all(b"\n").is_ok() {
            let _ = out.flush();
        }
    }

    /// Look up the built-in named by `node.argv[0]`, if any.
    pub fn resolve_builtin(&self, node: &CommandNode) -> Option<Rc<dyn ShellCommand>> {
        node.name().and_then(|name| self.commands.get(name).cloned())
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl fmt::Debug for ShellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellState")
            .field("config", &self.config)
            .field("dir_stack", &self.dir_stack)
            .field("last_status", &self.last_status)
            .field("last_background", &self.last_background)
            .finish_non_exhaustive()
    }
}
