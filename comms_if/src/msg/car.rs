//! # Vehicle telemetry

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the ego vehicle as reported by the car interface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct CarState {
    /// Ego speed estimate.
    ///
    /// Units: meters/second
    pub v_ego: f64,

    /// Speed shown on the instrument cluster.
    ///
    /// Units: meters/second
    pub v_ego_cluster: f64,

    /// Currently selected gear
    pub gear_shifter: GearShifter,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Gear selector positions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GearShifter {
    Unknown,
    Park,
    Drive,
    Neutral,
    Reverse,
    Sport,
    Low,
    Brake,
    Eco,
    Manumatic,
}

impl Default for GearShifter {
    fn default() -> Self {
        GearShifter::Unknown
    }
}
