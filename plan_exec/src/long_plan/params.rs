//! Parameters structures for LongPlan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{FollowParams, LongPlanError, PersonalityParams, ProfileParams, TrafficModeParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for longitudinal planning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Params {
    /// Allow the conditional experimental mode decider to run
    #[serde(default)]
    pub conditional_experimental_mode: bool,

    // ---- ENVELOPE ----
    #[serde(default)]
    pub profile: ProfileParams,

    // ---- BASELINES ----
    #[serde(default)]
    pub personality: PersonalityParams,

    #[serde(default)]
    pub traffic_mode: TrafficModeParams,

    // ---- FOLLOW ----
    #[serde(default)]
    pub follow: FollowParams,
}

/// Absolute longitudinal capabilities of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VehicleCaps {
    /// Strongest deceleration the vehicle can command.
    ///
    /// Units: meters/second^2
    pub accel_min: f64,

    /// Strongest acceleration the vehicle can command.
    ///
    /// Units: meters/second^2
    pub accel_max: f64,

    /// True if openpilot has longitudinal control of this vehicle
    pub long_control_available: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check every tuning value is usable.
    pub fn validate(&self) -> Result<(), LongPlanError> {
        self.personality.validate()?;
        self.traffic_mode.validate()?;
        self.follow.validate()
    }
}

impl VehicleCaps {
    /// Check the limits bracket zero.
    pub fn validate(&self) -> Result<(), LongPlanError> {
        let ok = self.accel_min.is_finite()
            && self.accel_max.is_finite()
            && self.accel_min < 0.0
            && self.accel_max > 0.0;

        match ok {
            true => Ok(()),
            false => Err(LongPlanError::InvalidVehicleCaps {
                accel_min: self.accel_min,
                accel_max: self.accel_max,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), LongPlanError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(LongPlanError::NonPositiveParam { name, value })
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), LongPlanError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(LongPlanError::NegativeParam { name, value })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::long_plan::{AccelProfile, DecelProfile};

    #[test]
    fn test_shipped_params() {
        let params: Params =
            util::params::from_str(include_str!("../../../params/long_plan.toml")).unwrap();
        params.validate().unwrap();

        let caps: VehicleCaps =
            util::params::from_str(include_str!("../../../params/vehicle.toml")).unwrap();
        caps.validate().unwrap();
    }

    #[test]
    fn test_partial_params() {
        let params: Params = util::params::from_str(
            r#"
            [profile]
            acceleration = "sport+"
            deceleration = "eco"

            [follow]
            smoother_braking = true
            "#,
        )
        .unwrap();

        assert_eq!(params.profile.acceleration, AccelProfile::SportPlus);
        assert_eq!(params.profile.deceleration, DecelProfile::Eco);
        assert!(params.follow.smoother_braking);
        assert!(!params.follow.smoother_braking_jerk);
        assert!(!params.conditional_experimental_mode);
        assert_eq!(params.personality, PersonalityParams::default());
        params.validate().unwrap();
    }

    #[test]
    fn test_partial_tables() {
        let params: Params = util::params::from_str(
            r#"
            [profile]
            acceleration = "eco"

            [personality]
            custom_personalities = false

            [traffic_mode]
            t_follow = [0.5, 1.5]
            "#,
        )
        .unwrap();

        assert_eq!(params.profile.acceleration, AccelProfile::Eco);
        assert_eq!(params.profile.deceleration, ProfileParams::default().deceleration);
        assert_eq!(params.personality, PersonalityParams::default());
        assert_eq!(params.traffic_mode.t_follow, [0.5, 1.5]);
        assert_eq!(
            params.traffic_mode.jerk_speed,
            TrafficModeParams::default().jerk_speed
        );
        params.validate().unwrap();
    }

    #[test]
    fn test_unknown_profile() {
        let res: Result<Params, _> = util::params::from_str(
            r#"
            [profile]
            acceleration = "turbo"
            deceleration = "stock"
            "#,
        );

        assert!(res.is_err());
    }

    #[test]
    fn test_negative_stopping_distance() {
        let mut params = Params::default();
        params.follow.increased_stopping_distance_m = -1.0;

        assert!(matches!(
            params.validate(),
            Err(LongPlanError::NegativeParam {
                name: "follow.increased_stopping_distance_m",
                ..
            })
        ));
    }

    #[test]
    fn test_vehicle_caps() {
        let ok = VehicleCaps {
            accel_min: -3.5,
            accel_max: 2.0,
            long_control_available: true,
        };
        assert!(ok.validate().is_ok());

        for (min, max) in [(0.0, 2.0), (-3.5, 0.0), (1.0, 2.0), (f64::NAN, 2.0), (-3.5, f64::INFINITY)]
            .iter()
        {
            let caps = VehicleCaps {
                accel_min: *min,
                accel_max: *max,
                ..ok
            };
            assert!(matches!(
                caps.validate(),
                Err(LongPlanError::InvalidVehicleCaps { .. })
            ));
        }
    }

    #[test]
    fn test_checks() {
        assert!(check_positive("x", 0.1).is_ok());
        assert!(check_positive("x", 0.0).is_err());
        assert!(check_positive("x", f64::INFINITY).is_err());
        assert!(check_non_negative("x", 0.0).is_ok());
        assert!(check_non_negative("x", -0.1).is_err());
        assert!(check_non_negative("x", f64::NAN).is_err());
    }
}
