//! # Driver control settings

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Control state published by the controls process.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ControlsState {
    /// Set cruise speed, or the unset sentinel (255) if cruise is not set.
    ///
    /// Units: kilometers/hour
    pub v_cruise_kph: f64,

    /// Set cruise speed as shown on the instrument cluster.
    ///
    /// Units: kilometers/hour
    pub v_cruise_cluster_kph: f64,

    /// True if longitudinal control is engaged
    pub enabled: bool,

    /// True if the driver has selected experimental mode
    pub experimental_mode: bool,

    /// Longitudinal personality code: 0 aggressive, 1 standard, 2 relaxed.
    pub personality: i32,
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            v_cruise_kph: 255.0,
            v_cruise_cluster_kph: 0.0,
            enabled: false,
            experimental_mode: false,
            personality: 1,
        }
    }
}
