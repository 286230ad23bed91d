//! Removal of unpacked libraries when the process exits.
//!
//! A [`MaterializedLibrary`](crate::MaterializedLibrary) deletes its file when
//! dropped. An entry point may end the process with `exit` before anything is
//! dropped, so every unpacked file is also registered here and an exit hook
//! removes whatever is still registered.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

static PENDING: Registry = Registry::new();
static HOOK: Once = Once::new();

/// Paths still waiting to be removed.
pub(crate) struct Registry {
    paths: Mutex<Vec<PathBuf>>,
}

impl Registry {
    pub(crate) const fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, path: &Path) {
        self.lock().push(path.to_path_buf());
    }

    pub(crate) fn remove(&self, path: &Path) {
        self.lock().retain(|p| p != path);
    }

    /// Delete every registered file and forget it. Failures are ignored.
    pub(crate) fn sweep(&self) {
        for path in self.lock().drain(..) {
            let _ = fs::remove_file(path);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Remove `path` at process exit unless it is released first.
pub(crate) fn register(path: &Path) {
    HOOK.call_once(install_hook);
    PENDING.add(path);
}

/// The file at `path` is being deleted by its owner.
pub(crate) fn release(path: &Path) {
    PENDING.remove(path);
}

#[cfg(test)]
pub(crate) fn is_registered(path: &Path) -> bool {
    PENDING.lock().iter().any(|p| p == path)
}

#[cfg(unix)]
fn install_hook() {
    use tracing::warn;

    extern "C" fn sweep_pending() {
        PENDING.sweep();
    }

    if unsafe { libc::atexit(sweep_pending) } != 0 {
        warn!("cannot register exit hook; an early exit may leave unpacked libraries behind");
    }
}

#[cfg(not(unix))]
fn install_hook() {}
