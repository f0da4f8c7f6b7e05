//! Acceleration envelope selection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{LongPlanError, VehicleCaps};
use util::maths::{interp, validate_table};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

// MPH = [0., 18,  36,  63,  94]
const A_CRUISE_MIN_BP_CUSTOM: [f64; 5] = [0., 8., 16., 28., 42.];
// MPH = [0., 6.71, 13.4, 17.9, 24.6, 33.6, 44.7, 55.9, 67.1, 123]
const A_CRUISE_MAX_BP_CUSTOM: [f64; 10] = [0., 3., 6., 8., 11., 15., 20., 25., 30., 55.];

const A_CRUISE_MIN_VALS_ECO: [f64; 5] = [-0.001, -0.010, -0.28, -0.56, -0.56];
const A_CRUISE_MAX_VALS_ECO: [f64; 10] = [3.5, 3.2, 2.3, 2.0, 1.15, 0.80, 0.58, 0.36, 0.30, 0.091];

const A_CRUISE_MIN_VALS_SPORT: [f64; 5] = [-0.50, -0.52, -0.55, -0.57, -0.60];
const A_CRUISE_MAX_VALS_SPORT: [f64; 10] = [3.5, 3.5, 3.3, 2.8, 1.5, 1.0, 0.75, 0.6, 0.38, 0.2];

const A_CRUISE_MAX_BP_STOCK: [f64; 4] = [0., 10., 25., 40.];
const A_CRUISE_MAX_VALS_STOCK: [f64; 4] = [1.6, 1.2, 0.8, 0.6];

/// Minimum acceleration with the stock deceleration profile.
///
/// Units: meters/second^2
pub const A_CRUISE_MIN_STOCK: f64 = -1.2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Selected acceleration and deceleration profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileParams {
    pub acceleration: AccelProfile,
    pub deceleration: DecelProfile,
}

/// Acceleration bounds for the MPC.
///
/// Units: meters/second^2
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccelLimits {
    pub min_accel: f64,
    pub max_accel: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Acceleration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelProfile {
    Stock,
    Eco,
    Sport,
    #[serde(rename = "sport+")]
    SportPlus,
}

/// Deceleration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecelProfile {
    Stock,
    Eco,
    Sport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            acceleration: AccelProfile::Stock,
            deceleration: DecelProfile::Stock,
        }
    }
}

impl AccelLimits {
    /// True if the limits bracket zero, `min_accel < 0 <= max_accel`.
    pub fn is_valid(&self) -> bool {
        self.min_accel < 0.0 && self.max_accel >= 0.0
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the acceleration limits for the current speed.
///
/// Experimental mode widens the limits to the vehicle's absolute capabilities,
/// but only for a profile left at stock.
pub fn select_envelope(
    v_ego: f64,
    accel_profile: AccelProfile,
    decel_profile: DecelProfile,
    experimental_mode: bool,
    caps: &VehicleCaps,
) -> AccelLimits {
    let max_accel = match accel_profile {
        AccelProfile::Eco => interp(v_ego, &A_CRUISE_MAX_BP_CUSTOM, &A_CRUISE_MAX_VALS_ECO),
        AccelProfile::Sport | AccelProfile::SportPlus => {
            interp(v_ego, &A_CRUISE_MAX_BP_CUSTOM, &A_CRUISE_MAX_VALS_SPORT)
        }
        AccelProfile::Stock if experimental_mode => caps.accel_max,
        AccelProfile::Stock => stock_max_accel(v_ego),
    };

    let min_accel = match decel_profile {
        DecelProfile::Eco => interp(v_ego, &A_CRUISE_MIN_BP_CUSTOM, &A_CRUISE_MIN_VALS_ECO),
        DecelProfile::Sport => interp(v_ego, &A_CRUISE_MIN_BP_CUSTOM, &A_CRUISE_MIN_VALS_SPORT),
        DecelProfile::Stock if experimental_mode => caps.accel_min,
        DecelProfile::Stock => A_CRUISE_MIN_STOCK,
    };

    AccelLimits {
        min_accel,
        max_accel,
    }
}

/// Check every built-in envelope table can be interpolated.
pub fn validate_tables() -> Result<(), LongPlanError> {
    let tables: [(&'static str, &[f64], &[f64]); 5] = [
        ("eco max", &A_CRUISE_MAX_BP_CUSTOM, &A_CRUISE_MAX_VALS_ECO),
        ("sport max", &A_CRUISE_MAX_BP_CUSTOM, &A_CRUISE_MAX_VALS_SPORT),
        ("eco min", &A_CRUISE_MIN_BP_CUSTOM, &A_CRUISE_MIN_VALS_ECO),
        ("sport min", &A_CRUISE_MIN_BP_CUSTOM, &A_CRUISE_MIN_VALS_SPORT),
        ("stock max", &A_CRUISE_MAX_BP_STOCK, &A_CRUISE_MAX_VALS_STOCK),
    ];

    for &(name, bp, vals) in tables.iter() {
        validate_table(bp, vals)
            .map_err(|source| LongPlanError::InvalidTable { name, source })?;
    }

    Ok(())
}

/// Stock speed dependent maximum acceleration.
pub fn stock_max_accel(v_ego: f64) -> f64 {
    interp(v_ego, &A_CRUISE_MAX_BP_STOCK, &A_CRUISE_MAX_VALS_STOCK)
}
