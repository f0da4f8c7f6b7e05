//! Personality and traffic mode baselines
//!
//! Resolves the unadjusted jerk and follow time values for the cycle. These
//! are the values the follow adjustment scales, and are also published as the
//! "stock" jerk costs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{FollowValues, LongPlanError, CITY_SPEED_LIMIT_MS};
use util::maths::interp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Breakpoints of every traffic mode table.
///
/// Units: meters/second
pub const TRAFFIC_MODE_BP: [f64; 2] = [0.0, CITY_SPEED_LIMIT_MS];

/// Default tuning of the aggressive personality.
pub const AGGRESSIVE_DEFAULT: PersonalityTuning = PersonalityTuning {
    jerk_acceleration: 0.5,
    jerk_speed: 0.5,
    t_follow: 1.25,
};

/// Default tuning of the standard personality.
pub const STANDARD_DEFAULT: PersonalityTuning = PersonalityTuning {
    jerk_acceleration: 1.0,
    jerk_speed: 1.0,
    t_follow: 1.45,
};

/// Default tuning of the relaxed personality.
pub const RELAXED_DEFAULT: PersonalityTuning = PersonalityTuning {
    jerk_acceleration: 1.0,
    jerk_speed: 1.0,
    t_follow: 1.75,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Jerk and follow time values for one personality.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PersonalityTuning {
    /// Acceleration jerk ratio
    pub jerk_acceleration: f64,

    /// Speed jerk ratio
    pub jerk_speed: f64,

    /// Follow time.
    ///
    /// Units: seconds
    pub t_follow: f64,
}

/// Personality parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PersonalityParams {
    /// Use the tunings below instead of the defaults
    pub custom_personalities: bool,

    pub aggressive: PersonalityTuning,
    pub standard: PersonalityTuning,
    pub relaxed: PersonalityTuning,
}

/// Traffic mode tables, each indexed by `TRAFFIC_MODE_BP`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrafficModeParams {
    pub jerk_acceleration: [f64; 2],
    pub jerk_speed: [f64; 2],

    /// Units: seconds
    pub t_follow: [f64; 2],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Longitudinal driving personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Personality {
    Aggressive,
    Standard,
    Relaxed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Personality {
    /// Decode the personality code carried by `ControlsState`.
    ///
    /// Returns `None` for codes with no matching personality.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Personality::Aggressive),
            1 => Some(Personality::Standard),
            2 => Some(Personality::Relaxed),
            _ => None,
        }
    }
}

impl PersonalityTuning {
    pub(crate) fn as_follow_values(&self) -> FollowValues {
        FollowValues {
            acceleration_jerk: self.jerk_acceleration,
            speed_jerk: self.jerk_speed,
            t_follow: self.t_follow,
        }
    }

    fn validate(&self, names: [&'static str; 3]) -> Result<(), LongPlanError> {
        super::params::check_positive(names[0], self.jerk_acceleration)?;
        super::params::check_positive(names[1], self.jerk_speed)?;
        super::params::check_positive(names[2], self.t_follow)
    }
}

impl PersonalityParams {
    /// Tuning for the given personality, taking `custom_personalities` into
    /// account.
    pub fn tuning(&self, personality: Personality) -> PersonalityTuning {
        match (self.custom_personalities, personality) {
            (true, Personality::Aggressive) => self.aggressive,
            (true, Personality::Standard) => self.standard,
            (true, Personality::Relaxed) => self.relaxed,
            (false, Personality::Aggressive) => AGGRESSIVE_DEFAULT,
            (false, Personality::Standard) => STANDARD_DEFAULT,
            (false, Personality::Relaxed) => RELAXED_DEFAULT,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LongPlanError> {
        self.aggressive.validate([
            "personality.aggressive.jerk_acceleration",
            "personality.aggressive.jerk_speed",
            "personality.aggressive.t_follow",
        ])?;
        self.standard.validate([
            "personality.standard.jerk_acceleration",
            "personality.standard.jerk_speed",
            "personality.standard.t_follow",
        ])?;
        self.relaxed.validate([
            "personality.relaxed.jerk_acceleration",
            "personality.relaxed.jerk_speed",
            "personality.relaxed.t_follow",
        ])
    }
}

impl Default for PersonalityParams {
    fn default() -> Self {
        Self {
            custom_personalities: false,
            aggressive: AGGRESSIVE_DEFAULT,
            standard: STANDARD_DEFAULT,
            relaxed: RELAXED_DEFAULT,
        }
    }
}

impl TrafficModeParams {
    pub(crate) fn validate(&self) -> Result<(), LongPlanError> {
        for v in self.jerk_acceleration.iter() {
            super::params::check_positive("traffic_mode.jerk_acceleration", *v)?;
        }
        for v in self.jerk_speed.iter() {
            super::params::check_positive("traffic_mode.jerk_speed", *v)?;
        }
        for v in self.t_follow.iter() {
            super::params::check_positive("traffic_mode.t_follow", *v)?;
        }

        Ok(())
    }
}

impl Default for TrafficModeParams {
    fn default() -> Self {
        Self {
            jerk_acceleration: [0.5, AGGRESSIVE_DEFAULT.jerk_acceleration],
            jerk_speed: [0.5, AGGRESSIVE_DEFAULT.jerk_speed],
            t_follow: [0.5, AGGRESSIVE_DEFAULT.t_follow],
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve the baseline jerk and follow time for this cycle.
///
/// Traffic mode overrides the personality entirely. No clamping is performed
/// here, positivity is guaranteed by parameter validation.
pub fn resolve_baseline(
    traffic_mode_active: bool,
    v_ego: f64,
    personality: Personality,
    personality_params: &PersonalityParams,
    traffic_params: &TrafficModeParams,
) -> FollowValues {
    if traffic_mode_active {
        FollowValues {
            acceleration_jerk: interp(v_ego, &TRAFFIC_MODE_BP, &traffic_params.jerk_acceleration),
            speed_jerk: interp(v_ego, &TRAFFIC_MODE_BP, &traffic_params.jerk_speed),
            t_follow: interp(v_ego, &TRAFFIC_MODE_BP, &traffic_params.t_follow),
        }
    } else {
        personality_params.tuning(personality).as_follow_values()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn custom() -> PersonalityParams {
        PersonalityParams {
            custom_personalities: true,
            aggressive: PersonalityTuning {
                jerk_acceleration: 0.3,
                jerk_speed: 0.4,
                t_follow: 1.0,
            },
            standard: PersonalityTuning {
                jerk_acceleration: 0.9,
                jerk_speed: 0.8,
                t_follow: 1.5,
            },
            relaxed: PersonalityTuning {
                jerk_acceleration: 1.2,
                jerk_speed: 1.1,
                t_follow: 2.0,
            },
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Personality::from_code(0), Some(Personality::Aggressive));
        assert_eq!(Personality::from_code(1), Some(Personality::Standard));
        assert_eq!(Personality::from_code(2), Some(Personality::Relaxed));
        assert_eq!(Personality::from_code(3), None);
        assert_eq!(Personality::from_code(-1), None);
    }

    #[test]
    fn test_defaults_ignore_custom_tables() {
        let mut params = custom();
        params.custom_personalities = false;

        let base = resolve_baseline(
            false,
            20.0,
            Personality::Standard,
            &params,
            &TrafficModeParams::default(),
        );

        assert_eq!(
            base,
            FollowValues {
                acceleration_jerk: 1.0,
                speed_jerk: 1.0,
                t_follow: 1.45
            }
        );
    }

    #[test]
    fn test_custom_tables() {
        let params = custom();
        let traffic = TrafficModeParams::default();

        let relaxed = resolve_baseline(false, 10.0, Personality::Relaxed, &params, &traffic);
        assert_eq!(relaxed, params.relaxed.as_follow_values());

        let aggressive = resolve_baseline(false, 10.0, Personality::Aggressive, &params, &traffic);
        assert_eq!(aggressive.t_follow, 1.0);
    }

    #[test]
    fn test_traffic_mode_overrides_personality() {
        let traffic = TrafficModeParams {
            jerk_acceleration: [0.2, 0.6],
            jerk_speed: [0.4, 0.8],
            t_follow: [0.5, 1.5],
        };

        let mid = resolve_baseline(true, 12.5, Personality::Relaxed, &custom(), &traffic);
        assert!((mid.acceleration_jerk - 0.4).abs() < 1e-12);
        assert!((mid.speed_jerk - 0.6).abs() < 1e-12);
        assert!((mid.t_follow - 1.0).abs() < 1e-12);

        let fast = resolve_baseline(true, 40.0, Personality::Aggressive, &custom(), &traffic);
        assert_eq!(fast.t_follow, 1.5);

        let stopped = resolve_baseline(true, 0.0, Personality::Standard, &custom(), &traffic);
        assert_eq!(stopped.t_follow, 0.5);
    }

    #[test]
    fn test_validation() {
        assert!(custom().validate().is_ok());
        assert!(TrafficModeParams::default().validate().is_ok());

        let mut params = custom();
        params.relaxed.t_follow = 0.0;
        assert!(matches!(
            params.validate(),
            Err(LongPlanError::NonPositiveParam {
                name: "personality.relaxed.t_follow",
                ..
            })
        ));

        let mut traffic = TrafficModeParams::default();
        traffic.jerk_speed[1] = f64::NAN;
        assert!(matches!(
            traffic.validate(),
            Err(LongPlanError::NonPositiveParam {
                name: "traffic_mode.jerk_speed",
                ..
            })
        ));
    }
}
