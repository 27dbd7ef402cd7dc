//! Helpers shared by tests that fork, reap or change directory.
//!
//! The working directory and the child table belong to the whole test
//! process, so those tests take [`lock`] first.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use crate::{ShellConfig, ShellState};

static PROCESS_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn lock() -> MutexGuard<'static, ()> {
    PROCESS_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores the working directory on drop.
pub(crate) struct CwdGuard(PathBuf);

impl CwdGuard {
    pub(crate) fn new() -> Self {
        Self(std::env::current_dir().unwrap())
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

/// State whose variables do not touch the test process environment.
pub(crate) fn detached_state() -> ShellState {
    ShellState::with_vars(
        ShellConfig::default(),
        Box::<HashMap<String, String>>::default(),
    )
}

pub(crate) fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// In-memory writer whose clones share one buffer, for capturing job notices.
#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
