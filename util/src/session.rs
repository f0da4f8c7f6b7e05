//! Session management
//!
//! A session is one run of an executable. It owns a directory under the
//! software root holding the run's log file and its `arch/` archive tree, and
//! fixes the epoch that log lines and replays are timed against.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Format of the timestamp in session directory names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Number of suffixed names tried when a session directory already exists.
const MAX_NAME_ATTEMPTS: u32 = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Directories and files belonging to one session.
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (LONG_PLAN_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("Could not find a free session directory name after {0} attempts")]
    NoFreeName(u32),

    #[error("A session has already been started in this process")]
    AlreadyStarted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the process's session in `$LONG_PLAN_SW_ROOT/<sessions_dir>`.
    ///
    /// Fixes the session epoch, so may only be called once per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let epoch = start_epoch()?;

        let mut parent = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;
        parent.push(sessions_dir);

        Self::create(parent, exec_name, epoch)
    }

    /// Create a session tree inside `parent` without touching the session
    /// epoch.
    ///
    /// Used by tools and tests which need the directory layout but not the
    /// process-wide clock.
    pub fn in_dir<P: AsRef<Path>>(parent: P, exec_name: &str) -> Result<Self, SessionError> {
        Self::create(parent.as_ref().to_path_buf(), exec_name, &Utc::now())
    }

    /// Path of an archive file relative to the archive root.
    pub fn arch_path<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.arch_root.join(rel)
    }

    fn create(
        parent: PathBuf,
        exec_name: &str,
        stamp: &DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        fs::create_dir_all(&parent).map_err(SessionError::CannotCreateDir)?;

        let base_name = format!("{}_{}", exec_name, stamp.format(TIMESTAMP_FORMAT));
        let session_root = claim_dir(&parent, &base_name)?;

        let arch_root = session_root.join("arch");
        fs::create_dir(&arch_root).map_err(SessionError::CannotCreateDir)?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            arch_root,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds elapsed since the session epoch, or zero if no session has been
/// started in this process.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => time::duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN),
        None => 0.0,
    }
}

/// The session epoch, if a session has been started.
pub fn epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn start_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH
        .try_init_once(Utc::now)
        .map_err(|_| SessionError::AlreadyStarted)?;

    SESSION_EPOCH.get().ok_or(SessionError::AlreadyStarted)
}

/// Create `parent/base_name`, or the first free `parent/base_name_<n>` if two
/// sessions start within the same second.
fn claim_dir(parent: &Path, base_name: &str) -> Result<PathBuf, SessionError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = match attempt {
            0 => parent.join(base_name),
            n => parent.join(format!("{}_{}", base_name, n)),
        };

        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(SessionError::CannotCreateDir(e)),
        }
    }

    Err(SessionError::NoFreeName(MAX_NAME_ATTEMPTS))
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_parent(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("util_session_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_in_dir_layout() {
        let parent = temp_parent("layout");

        let session = Session::in_dir(&parent, "plan_exec").unwrap();

        assert!(session.session_root.starts_with(&parent));
        assert!(session.arch_root.is_dir());
        assert_eq!(session.arch_root, session.session_root.join("arch"));
        assert_eq!(
            session.log_file_path,
            session.session_root.join("plan_exec.log")
        );
        assert_eq!(
            session.arch_path("long_plan/output.csv"),
            session.arch_root.join("long_plan").join("output.csv")
        );

        fs::remove_dir_all(&parent).ok();
    }

    #[test]
    fn test_same_second_sessions_do_not_collide() {
        let parent = temp_parent("collide");
        fs::create_dir_all(&parent).unwrap();

        let first = claim_dir(&parent, "plan_exec_20240101_000000").unwrap();
        let second = claim_dir(&parent, "plan_exec_20240101_000000").unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().and_then(|n| n.to_str()),
            Some("plan_exec_20240101_000000_1")
        );

        fs::remove_dir_all(&parent).ok();
    }
}
