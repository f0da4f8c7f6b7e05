//! # Planner messages
//!
//! Every message is a plain value type. The planner copies each cycle's inputs
//! in by value and never holds references to them beyond the cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod car;
mod controls;
mod plan;
mod radar;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use car::*;
pub use controls::*;
pub use plan::*;
pub use radar::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A snapshot of everything the longitudinal planner consumes in one cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct PlannerFrame {
    /// Vehicle telemetry
    pub car_state: CarState,

    /// Driver control settings
    pub controls_state: ControlsState,

    /// Lead vehicle estimates
    pub radar_state: RadarState,

    /// True if traffic mode has been engaged by the driver
    pub traffic_mode_active: bool,

    /// Curvature of the road ahead from the curvature estimator.
    ///
    /// Units: 1/meters
    pub road_curvature: f64,

    /// True if every input service passed its freshness and validity checks
    pub valid: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_frame_json() {
        let frame: PlannerFrame = serde_json::from_str(
            r#"{
                "car_state": {"v_ego": 12.5, "gear_shifter": "drive"},
                "controls_state": {"v_cruise_kph": 90.0, "enabled": true, "personality": 2},
                "radar_state": {"lead_one": {"status": true, "d_rel": 40.0, "v_lead": 11.0}},
                "valid": true
            }"#,
        )
        .unwrap();

        assert_eq!(frame.car_state.v_ego, 12.5);
        assert_eq!(frame.car_state.gear_shifter, GearShifter::Drive);
        assert_eq!(frame.controls_state.personality, 2);
        assert!(frame.controls_state.enabled);
        assert!(!frame.controls_state.experimental_mode);
        assert!(frame.radar_state.lead_one.status);
        assert_eq!(frame.radar_state.lead_one.v_rel, 0.0);
        assert!(!frame.traffic_mode_active);
        assert!(frame.valid);
    }
}
