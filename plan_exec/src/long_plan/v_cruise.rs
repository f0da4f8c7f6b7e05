//! Cruise speed target aggregation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{KPH_TO_MS, V_CRUISE_UNSET_KPH};
use comms_if::msg::{CarState, ControlsState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Values available to a cruise target provider in one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseContext {
    /// Units: meters/second
    pub v_ego: f64,

    /// Set cruise speed, capped at the unset sentinel.
    ///
    /// Units: meters/second
    pub v_cruise: f64,

    /// Difference between the cluster's set speed and `v_cruise`.
    ///
    /// Units: meters/second
    pub v_cruise_diff: f64,

    /// Difference between the cluster's displayed speed and `v_ego`.
    ///
    /// Units: meters/second
    pub v_ego_diff: f64,

    /// True if longitudinal control is engaged
    pub enabled: bool,

    /// Units: 1/meters
    pub road_curvature: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of cruise speed targets, such as a speed limit or curvature
/// controller.
pub trait CruiseTargetProvider {
    /// Name used in logs
    fn name(&self) -> &str;

    /// The provider's target for this cycle.
    ///
    /// A target at or below the cruising speed threshold is treated as "no
    /// target yet".
    ///
    /// Units: meters/second
    fn target_ms(&mut self, ctx: &CruiseContext) -> f64;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CruiseContext {
    /// Build the context from the cycle's inputs.
    pub fn new(
        car_state: &CarState,
        controls_state: &ControlsState,
        v_ego: f64,
        road_curvature: f64,
    ) -> Self {
        let v_cruise = controls_state.v_cruise_kph.min(V_CRUISE_UNSET_KPH) * KPH_TO_MS;
        let v_cruise_cluster = controls_state
            .v_cruise_cluster_kph
            .max(controls_state.v_cruise_kph)
            * KPH_TO_MS;
        let v_ego_cluster = car_state.v_ego_cluster.max(v_ego);

        Self {
            v_ego,
            v_cruise,
            v_cruise_diff: v_cruise_cluster - v_cruise,
            v_ego_diff: v_ego_cluster - v_ego,
            enabled: controls_state.enabled,
            road_curvature,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Combine the primary cruise target with the candidate targets.
///
/// Candidates at or below `cruising_speed_floor` (or NaN) are replaced by the
/// primary target. The result is the minimum of the primary and the remaining
/// candidates.
pub fn aggregate(primary: f64, candidates: &[f64], cruising_speed_floor: f64) -> f64 {
    candidates
        .iter()
        .map(|&target| {
            if target > cruising_speed_floor {
                target
            } else {
                primary
            }
        })
        .fold(primary, f64::min)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_aggregate() {
        assert_eq!(aggregate(10.0, &[], 5.0), 10.0);
        assert_eq!(aggregate(10.0, &[3.0], 5.0), 10.0);
        assert_eq!(aggregate(10.0, &[12.0, 8.0], 5.0), 8.0);
    }

    #[test]
    fn test_aggregate_floor_is_exclusive() {
        assert_eq!(aggregate(10.0, &[5.0], 5.0), 10.0);
        assert_eq!(aggregate(10.0, &[5.5], 5.0), 5.5);
    }

    #[test]
    fn test_aggregate_ignores_nan() {
        assert_eq!(aggregate(10.0, &[f64::NAN, 9.0], 5.0), 9.0);
    }

    #[test]
    fn test_context() {
        let car = CarState {
            v_ego: 20.0,
            v_ego_cluster: 20.5,
            ..CarState::default()
        };
        let controls = ControlsState {
            v_cruise_kph: 90.0,
            v_cruise_cluster_kph: 92.0,
            enabled: true,
            ..ControlsState::default()
        };

        let ctx = CruiseContext::new(&car, &controls, 20.0, 0.001);
        assert!((ctx.v_cruise - 25.0).abs() < 1e-12);
        assert!((ctx.v_cruise_diff - 2.0 / 3.6).abs() < 1e-12);
        assert!((ctx.v_ego_diff - 0.5).abs() < 1e-12);
        assert!(ctx.enabled);

        // Unset cruise is capped at the sentinel
        let unset = ControlsState {
            v_cruise_kph: 1000.0,
            ..controls
        };
        let ctx = CruiseContext::new(&car, &unset, 20.0, 0.0);
        assert!((ctx.v_cruise - V_CRUISE_UNSET_KPH / 3.6).abs() < 1e-9);
    }
}
