//! # Longitudinal planning library.
//!
//! This library allows other crates in the workspace to access items defined inside the planner
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable
pub mod data_store;

/// Longitudinal planning module - converts telemetry and lead estimates into MPC parameters
pub mod long_plan;
