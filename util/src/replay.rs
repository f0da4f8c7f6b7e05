//! # Replay module
//!
//! This module plays back timestamped input frames from a replay file so a
//! cyclic executable can be driven without a live message bus.
//!
//! A replay file is a sequence of entries of the form
//!
//! ```text
//! <time_s>: <frame as JSON>;
//! ```
//!
//! one per line, in ascending time order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A frame which is scheduled to be released at a specific time.
struct Entry<T> {
    /// The time the frame becomes available
    release_time_s: f64,

    /// The frame itself
    frame: T
}

/// A replay of timestamped frames.
///
/// After loading use `.get_pending` to acquire the frames which are due at
/// the current time.
pub struct Replay<T> {
    entries: VecDeque<Entry<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Could not find the replay at {0}")]
    ReplayNotFound(String),

    #[error("Could not load the replay: {0}")]
    ReplayLoadError(std::io::Error),

    #[error("The replay is empty (or is so bad it can't be read)")]
    ReplayEmpty,

    #[error(
        "Replay contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Replay timestamps go backwards at {0} s")]
    OutOfOrder(f64),

    #[error("Replay contains an invalid frame at {0} s: {1}")]
    InvalidFrame(f64, serde_json::Error),

    #[error("Could not build the replay entry pattern: {0}")]
    PatternError(regex::Error)
}

/// Frames released by a call to `Replay::get_pending`.
pub enum Pending<T> {
    None,
    Some(Vec<T>),
    EndOfReplay
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: DeserializeOwned> Replay<T> {

    /// Load a replay from the given path.
    pub fn new<P: AsRef<Path>>(replay_path: P) -> Result<Self, ReplayError> {

        let path = replay_path.as_ref();

        // Check that the replay file exists.
        if !path.exists() {
            return Err(
                ReplayError::ReplayNotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(path)
            .map_err(ReplayError::ReplayLoadError)?;

        Self::from_str(&text)
    }

    /// Parse a replay from its text.
    pub fn from_str(text: &str) -> Result<Self, ReplayError> {

        let mut entries: VecDeque<Entry<T>> = VecDeque::new();

        // Each entry is a timestamp, a colon and a JSON payload up to the
        // terminating semicolon.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ReplayError::PatternError)?;

        for cap in re.captures_iter(text) {
            let release_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ReplayError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = entries.back() {
                if release_time_s < prev.release_time_s {
                    return Err(ReplayError::OutOfOrder(release_time_s))
                }
            }

            let frame = serde_json::from_str(&cap[3])
                .map_err(|e| ReplayError::InvalidFrame(release_time_s, e))?;

            entries.push_back(Entry {
                release_time_s,
                frame
            });
        }

        if entries.is_empty() {
            return Err(ReplayError::ReplayEmpty)
        }

        Ok(Replay { entries })
    }
}

impl<T> Replay<T> {

    /// Return all frames whose release time is before `current_time_s`.
    pub fn get_pending(&mut self, current_time_s: f64) -> Pending<T> {

        // If the queue is empty the replay is over
        if self.entries.is_empty() {
            return Pending::EndOfReplay
        }

        let mut frames: Vec<T> = vec![];

        while let Some(entry) = self.entries.front() {
            if entry.release_time_s >= current_time_s {
                break
            }
            if let Some(entry) = self.entries.pop_front() {
                frames.push(entry.frame);
            }
        }

        if frames.is_empty() {
            Pending::None
        }
        else {
            Pending::Some(frames)
        }
    }

    /// Get the number of frames remaining in the replay
    pub fn get_num_frames(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the replay in seconds
    pub fn get_duration(&self) -> f64 {
        match self.entries.back() {
            Some(e) => e.release_time_s,
            None => 0f64
        }
    }
}
