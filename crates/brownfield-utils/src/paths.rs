//! Filesystem layout of a brownfield project.
//!
//! ```text
//! <BROWNFIELD_HOME>/
//!   state.json
//!   checkpoints/<phase>_checkpoint.json
//!   archive/state-<YYYYmmdd_HHMMSS_micros>[-n].json
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;

// Thread-local override used only in tests to avoid process-global env races.
thread_local! {
    static THREAD_HOME: RefCell<Option<Utf8PathBuf>> = const { RefCell::new(None) };
}

/// File name of the aggregate state inside the state directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Resolve the brownfield state directory:
/// 1) thread-local override (tests use this)
/// 2) env `BROWNFIELD_HOME`
/// 3) default ".brownfield"
#[must_use]
pub fn brownfield_home() -> Utf8PathBuf {
    if let Some(tl) = THREAD_HOME.with(|tl| tl.borrow().clone()) {
        return tl;
    }
    if let Ok(p) = std::env::var("BROWNFIELD_HOME") {
        return Utf8PathBuf::from(p);
    }
    Utf8PathBuf::from(".brownfield")
}

/// Returns `<state_dir>/state.json`
#[must_use]
pub fn state_file(state_dir: &Utf8Path) -> Utf8PathBuf {
    state_dir.join(STATE_FILE_NAME)
}

/// Returns `<state_dir>/checkpoints`
#[must_use]
pub fn checkpoint_dir(state_dir: &Utf8Path) -> Utf8PathBuf {
    state_dir.join("checkpoints")
}

/// Returns `<state_dir>/archive`
#[must_use]
pub fn archive_dir(state_dir: &Utf8Path) -> Utf8PathBuf {
    state_dir.join("archive")
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// RAII guard for isolated home that clears thread-local state on drop
#[cfg(any(test, feature = "test-utils"))]
pub struct HomeGuard {
    inner: tempfile::TempDir,
}

#[cfg(any(test, feature = "test-utils"))]
impl HomeGuard {
    /// The isolated state directory as a UTF-8 path.
    #[must_use]
    pub fn home(&self) -> Utf8PathBuf {
        brownfield_home()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        THREAD_HOME.with(|tl| *tl.borrow_mut() = None);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl std::ops::Deref for HomeGuard {
    type Target = tempfile::TempDir;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Test helper: gives the current thread its own state directory under the
/// system temp dir. Hold the `HomeGuard` for the test's duration.
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(not(test), allow(dead_code))]
#[must_use]
pub fn with_isolated_home() -> HomeGuard {
    let td = tempfile::TempDir::new().expect("create temp home");
    let p = Utf8PathBuf::from_path_buf(td.path().join(".brownfield"))
        .expect("temp dir path is UTF-8");
    THREAD_HOME.with(|tl| *tl.borrow_mut() = Some(p));
    HomeGuard { inner: td }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_layout_under_state_dir() {
        let dir = Utf8Path::new("/project/.brownfield");

        assert_eq!(state_file(dir), "/project/.brownfield/state.json");
        assert_eq!(checkpoint_dir(dir), "/project/.brownfield/checkpoints");
        assert_eq!(archive_dir(dir), "/project/.brownfield/archive");
    }

    #[test]
    fn test_isolated_home_overrides_and_clears() {
        {
            let guard = with_isolated_home();
            let home = brownfield_home();
            assert!(home.starts_with(guard.path().to_str().unwrap()));
            assert_eq!(guard.home(), home);
        }
        assert!(THREAD_HOME.with(|tl| tl.borrow().is_none()));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        // SAFETY: serialized with other env-mutating tests.
        unsafe { std::env::set_var("BROWNFIELD_HOME", "/tmp/bf-home") };
        assert_eq!(brownfield_home(), "/tmp/bf-home");
        unsafe { std::env::remove_var("BROWNFIELD_HOME") };
        assert_eq!(brownfield_home(), ".brownfield");
    }

    #[test]
    fn test_ensure_dir_all_is_idempotent() {
        let td = tempfile::TempDir::new().unwrap();
        let nested = td.path().join("a").join("b");

        ensure_dir_all(&nested).unwrap();
        ensure_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
