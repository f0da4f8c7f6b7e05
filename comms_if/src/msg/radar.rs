//! # Lead vehicle estimates

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Radar and vision fusion output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct RadarState {
    /// The closest tracked vehicle in the ego lane
    pub lead_one: LeadData,
}

/// Relative kinematics of a tracked lead vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct LeadData {
    /// True if a lead is being tracked. The other fields are meaningless if
    /// this is false.
    pub status: bool,

    /// Distance to the lead.
    ///
    /// Units: meters
    pub d_rel: f64,

    /// Lead speed relative to the ego vehicle, positive when opening.
    ///
    /// Units: meters/second
    pub v_rel: f64,

    /// Absolute lead speed.
    ///
    /// Units: meters/second
    pub v_lead: f64,
}
