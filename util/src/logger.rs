//! Logger setup for planner executables
//!
//! Every line is prefixed with the session time and the number of the cycle
//! that emitted it, so log output can be lined up against the archives. The
//! terminal and the session log file are filtered separately, and individual
//! targets (e.g. `plan_lib::long_plan::follow`) can be given their own level.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Cycle number stamped on each log line.
static CYCLE: AtomicU64 = AtomicU64::new(0);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levels applied to each log sink.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLevels {
    /// Most verbose level printed to the terminal
    pub stdout: LevelFilter,

    /// Most verbose level written to the session log file
    pub file: LevelFilter,

    /// Per-target levels, applied to both sinks
    pub targets: Vec<(&'static str, LevelFilter)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The session log file must record at least `INFO`, found `{0}`")]
    FileLevelTooLow(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            stdout: LevelFilter::Info,
            file: LevelFilter::Trace,
            // The follow adjuster traces every cycle with a lead
            targets: vec![("plan_lib::long_plan::follow", LevelFilter::Debug)],
        }
    }
}

impl LogLevels {
    /// Levels for a terminal verbosity count, as given by repeated `-v` flags.
    pub fn with_verbosity(verbosity: u8) -> Self {
        let stdout = match verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        Self {
            stdout,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), LoggerInitError> {
        if self.file < LevelFilter::Info {
            return Err(LoggerInitError::FileLevelTooLow(self.file));
        }

        Ok(())
    }

    /// The most verbose level any sink or target will accept.
    fn most_verbose(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|(_, l)| *l)
            .fold(Ord::max(self.stdout, self.file), Ord::max)
    }

    fn apply_targets(&self, mut dispatch: fern::Dispatch) -> fern::Dispatch {
        for (target, level) in self.targets.iter() {
            dispatch = dispatch.level_for(*target, *level);
        }
        dispatch
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(levels: &LogLevels, session: &session::Session) -> Result<(), LoggerInitError> {
    levels.validate()?;

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let stdout = levels
        .apply_targets(fern::Dispatch::new().level(levels.stdout))
        .format(|out, _message, record| {
            out.finish(format_args!(
                "[{} {}]{}",
                line_prefix(session::get_elapsed_seconds(), current_cycle()),
                level_colour(record.level()),
                Body(record)
            ))
        })
        .chain(std::io::stdout());

    let file = levels
        .apply_targets(fern::Dispatch::new().level(levels.file))
        .format(|out, _message, record| {
            out.finish(format_args!(
                "[{} {}]{}",
                line_prefix(session::get_elapsed_seconds(), current_cycle()),
                level_tag(record.level()),
                Body(record)
            ))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(levels.most_verbose())
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Terminal level: {:?}", levels.stdout);
    info!("    File level: {:?}", levels.file);
    for (target, level) in levels.targets.iter() {
        info!("    {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Set the cycle number stamped on subsequent log lines.
pub fn set_cycle(cycle: u64) {
    CYCLE.store(cycle, Ordering::Relaxed);
}

/// The cycle number currently stamped on log lines.
pub fn current_cycle() -> u64 {
    CYCLE.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Session time and cycle number at the start of each line.
fn line_prefix(session_time_s: f64, cycle: u64) -> String {
    format!("{:10.6} #{:06}", session_time_s, cycle)
}

/// Plain level tag, used in the log file.
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

/// Coloured level tag, used on the terminal.
fn level_colour(level: Level) -> ColoredString {
    let tag = level_tag(level);
    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info => tag.normal(),
        Level::Warn => tag.yellow(),
        Level::Error => tag.red().bold(),
    }
}

/// Message body, naming the target on debug and trace lines.
struct Body<'a, 'b>(&'a Record<'b>);

impl fmt::Display for Body<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.level() > Level::Info {
            true => write!(f, " {}: {}", self.0.target(), self.0.args()),
            false => write!(f, " {}", self.0.args()),
        }
    }
}
