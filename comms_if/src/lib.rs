//! # Communications interface crate.
//!
//! Provides the messages exchanged between the longitudinal planner and the
//! rest of the driving stack.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Per-cycle input and output message definitions
pub mod msg;
