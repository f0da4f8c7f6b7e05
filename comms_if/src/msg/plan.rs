//! # Longitudinal plan parameters
//!
//! The record published to the longitudinal MPC every cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Bounded control parameters for the longitudinal MPC.
///
/// Jerk fields are already scaled into the controller's cost units.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct LongPlanMsg {
    /// Acceleration change cost after follow adjustment
    pub acceleration_jerk: f64,

    /// Acceleration change cost before follow adjustment
    pub acceleration_jerk_stock: f64,

    /// Ego jerk cost after follow adjustment
    pub speed_jerk: f64,

    /// Ego jerk cost before follow adjustment
    pub speed_jerk_stock: f64,

    /// Last decision of the conditional experimental mode module
    pub conditional_experimental: bool,

    /// Upper acceleration bound.
    ///
    /// Units: meters/second^2
    pub max_acceleration: f64,

    /// Lower acceleration bound.
    ///
    /// Units: meters/second^2
    pub min_acceleration: f64,

    /// Desired time gap to the lead.
    ///
    /// Units: seconds
    pub t_follow: f64,

    /// Cruise speed target.
    ///
    /// Units: meters/second
    pub v_cruise: f64,

    /// Road curvature used this cycle.
    ///
    /// Units: 1/meters
    pub road_curvature: f64,

    /// True if the inputs to this cycle were valid
    pub valid: bool,
}
