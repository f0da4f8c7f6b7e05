//! Conditional experimental mode interface
//!
//! The decision of whether to switch into experimental mode is made outside
//! LongPlan. LongPlan only calls the decider when the feature is enabled and
//! publishes its last decision.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::{CarState, LeadData};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Values handed to the decider each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondExpContext {
    pub car_state: CarState,
    pub enabled: bool,
    pub lead_one: LeadData,

    /// Units: 1/meters
    pub road_curvature: f64,

    /// Follow time after adjustment.
    ///
    /// Units: seconds
    pub t_follow: f64,

    /// Units: meters/second
    pub v_ego: f64,
}

/// Decider which never requests experimental mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCondExp;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Decides whether experimental mode should be used.
pub trait CondExpDecider {
    fn update(&mut self, ctx: &CondExpContext) -> bool;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CondExpDecider for NoCondExp {
    fn update(&mut self, _ctx: &CondExpContext) -> bool {
        false
    }
}
