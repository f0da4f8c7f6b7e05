//! # Longitudinal planning module
//!
//! LongPlan converts each cycle's vehicle telemetry, lead vehicle estimate and
//! driving personality settings into the bounded parameters consumed by the
//! longitudinal MPC: acceleration limits, jerk costs, a follow time and a
//! cruise speed target.
//!
//! Every cycle runs the same fixed sequence:
//!
//!  1. Acceleration envelope selection from the speed and the selected
//!     acceleration/deceleration profiles.
//!  1. Baseline jerk and follow time resolution from the personality or the
//!     traffic mode tables.
//!  1. Follow adjustment, which reacts to a lead that is pulling away or being
//!     closed on by scaling the baselines. Every scaling divisor is clamped
//!     between 1 and a ceiling derived from the lead distance.
//!  1. Cruise target aggregation.
//!
//! Anomalous inputs are clamped rather than rejected, so a cycle always
//! produces a finite output.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod accel_profile;
mod cond_exp;
mod follow;
mod params;
mod personality;
mod state;
mod v_cruise;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use accel_profile::*;
pub use cond_exp::*;
pub use follow::*;
pub use params::*;
pub use personality::*;
pub use state::*;
pub use v_cruise::*;

use util::maths::TableError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speed below which the vehicle is considered to be driving in a city.
///
/// Units: meters/second
pub const CITY_SPEED_LIMIT_MS: f64 = 25.0;

/// Cruise targets at or below this speed are not yet considered valid.
///
/// Units: meters/second
pub const CRUISING_SPEED_MS: f64 = 5.0;

/// Distance kept to a stopped lead.
///
/// Units: meters
pub const STOP_DISTANCE_M: f64 = 6.0;

/// Deceleration considered comfortable by the MPC.
///
/// Units: meters/second^2
pub const COMFORT_BRAKE_MSS: f64 = 2.5;

/// Converts the acceleration jerk ratio into MPC acceleration change cost.
pub const A_CHANGE_COST: f64 = 200.0;

/// Converts the speed jerk ratio into MPC ego jerk cost.
pub const J_EGO_COST: f64 = 5.0;

/// Cruise speed reported when cruise has not been set.
///
/// Units: kilometers/hour
pub const V_CRUISE_UNSET_KPH: f64 = 255.0;

/// Kilometers/hour to meters/second
pub const KPH_TO_MS: f64 = 1.0 / 3.6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Configuration errors. All of these are raised before the first cycle (or
/// on a rejected reload) and none can occur during cyclic processing.
#[derive(Debug, thiserror::Error)]
pub enum LongPlanError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Parameter table {name} is invalid: {source}")]
    InvalidTable {
        name: &'static str,
        source: TableError,
    },

    #[error("Parameter {name} must be positive and finite, found {value}")]
    NonPositiveParam { name: &'static str, value: f64 },

    #[error("Parameter {name} must be zero or positive and finite, found {value}")]
    NegativeParam { name: &'static str, value: f64 },

    #[error(
        "Vehicle acceleration limits must satisfy accel_min < 0 < accel_max, \
        found accel_min = {accel_min}, accel_max = {accel_max}"
    )]
    InvalidVehicleCaps { accel_min: f64, accel_max: f64 },
}
