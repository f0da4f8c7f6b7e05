//! Dynamic follow adjustment
//!
//! Scales the baseline jerk and follow time values in reaction to the lead's
//! motion relative to the ego vehicle:
//!
//! - A faster lead (pulling away) divides the follow time, and optionally the
//!   jerk values, so the ego vehicle accelerates after it more eagerly.
//! - A slower lead (being closed on) divides the follow time, and optionally
//!   multiplies the jerk values by a bounded factor, for a smoother approach.
//!
//! Every offset is clamped into `[1, distance_factor]` before use, where the
//! distance factor is itself at least 1, so a single cycle can only shrink the
//! follow time by a bounded amount and never divides by less than one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};

// Internal
use super::{LongPlanError, CITY_SPEED_LIMIT_MS, COMFORT_BRAKE_MSS, STOP_DISTANCE_M};
use comms_if::msg::LeadData;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Jerk ratios and follow time, either baseline or adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowValues {
    pub acceleration_jerk: f64,
    pub speed_jerk: f64,

    /// Units: seconds
    pub t_follow: f64,
}

/// Follow adjustment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FollowParams {
    /// Extra distance kept to a stopped lead at city speeds.
    ///
    /// Units: meters
    pub increased_stopping_distance_m: f64,

    /// Shorten the follow time behind a faster lead
    pub aggressive_acceleration: bool,

    /// Shorten both follow time and jerk behind a faster lead. Takes
    /// precedence over `aggressive_acceleration`.
    pub aggressive_acceleration_experimental: bool,

    /// Shorten the follow time when approaching a slower lead
    pub smoother_braking: bool,

    /// Let a distant slower lead shorten the follow time further
    pub smoother_braking_far_lead: bool,

    /// Scale the jerk values when approaching a slower lead
    pub smoother_braking_jerk: bool,
}

/// Result of the follow adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowAdjustment {
    /// The adjusted values
    pub values: FollowValues,

    /// Divisor applied for a faster lead, if that branch ran
    pub acceleration_offset: Option<f64>,

    /// Divisor applied for a slower lead, if that branch ran
    pub braking_offset: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowParams {
    pub(crate) fn validate(&self) -> Result<(), LongPlanError> {
        super::params::check_non_negative(
            "follow.increased_stopping_distance_m",
            self.increased_stopping_distance_m,
        )
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Adjust the baseline values for a tracked lead.
///
/// The lead must be tracked and have finite kinematics, and `v_ego` must be
/// finite and non-negative. `lead.d_rel` may be zero or negative (cut-in),
/// in which case every distance factor floors at 1.
pub fn adjust_follow(
    base: FollowValues,
    traffic_mode_active: bool,
    v_ego: f64,
    lead: &LeadData,
    params: &FollowParams,
) -> FollowAdjustment {
    let v_lead = lead.v_lead;

    // Above city speeds the extra stopping distance shrinks, and can go
    // negative
    let distance_offset = if traffic_mode_active {
        0.0
    } else {
        params.increased_stopping_distance_m + (CITY_SPEED_LIMIT_MS - v_ego).min(0.0)
    };
    let lead_distance = lead.d_rel - distance_offset;
    let stopping_distance = STOP_DISTANCE_M + distance_offset;

    let mut values = base;
    let mut acceleration_offset = None;
    let mut braking_offset = None;

    // ---- FASTER LEAD ----

    if v_lead > v_ego {
        if params.aggressive_acceleration_experimental {
            let distance_factor = distance_factor(lead_distance, v_ego, values.t_follow);
            let standstill_offset = (stopping_distance - v_ego).max(0.0);
            let offset = clamp(
                (v_lead - v_ego) + standstill_offset * (v_lead - v_ego).max(0.0)
                    - COMFORT_BRAKE_MSS,
                1.0,
                distance_factor,
            );

            values.acceleration_jerk /= offset;
            values.speed_jerk /= offset;
            values.t_follow /= offset;
            acceleration_offset = Some(offset);
        } else if params.aggressive_acceleration {
            let distance_factor = distance_factor(lead_distance, v_lead, values.t_follow);
            let standstill_offset = (STOP_DISTANCE_M - v_ego.powf(COMFORT_BRAKE_MSS)).max(0.0);
            let offset = clamp(
                (v_lead - v_ego) + standstill_offset - COMFORT_BRAKE_MSS,
                1.0,
                distance_factor,
            );

            values.t_follow /= offset;
            acceleration_offset = Some(offset);
        }
    }

    // ---- SLOWER LEAD ----

    if params.smoother_braking && v_lead < v_ego {
        let distance_factor = distance_factor(lead_distance, v_lead, values.t_follow);
        let far_lead_offset = if params.smoother_braking_far_lead {
            (lead_distance - v_ego * values.t_follow - stopping_distance
                + (v_lead - CITY_SPEED_LIMIT_MS))
                .max(0.0)
        } else {
            0.0
        };
        let offset = clamp(
            (v_ego - v_lead) + far_lead_offset - COMFORT_BRAKE_MSS,
            1.0,
            distance_factor,
        );

        if params.smoother_braking_jerk {
            values.acceleration_jerk *= offset.min(COMFORT_BRAKE_MSS / 2.0);
            values.speed_jerk *= offset.min(COMFORT_BRAKE_MSS * 2.0);
        }
        values.t_follow /= offset;
        braking_offset = Some(offset);
    }

    trace!(
        "Follow adjustment: lead_distance = {:.2} m, accel offset = {:?}, braking offset = {:?}",
        lead_distance,
        acceleration_offset,
        braking_offset
    );

    FollowAdjustment {
        values,
        acceleration_offset,
        braking_offset,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Ceiling on an offset: the distance left after keeping a `t_follow` gap at
/// speed `v`, floored at 1.
fn distance_factor(lead_distance: f64, v: f64, t_follow: f64) -> f64 {
    (lead_distance - v * t_follow).max(1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    const BASE: FollowValues = FollowValues {
        acceleration_jerk: 1.0,
        speed_jerk: 1.0,
        t_follow: 1.5,
    };

    fn lead(d_rel: f64, v_lead: f64, v_ego: f64) -> LeadData {
        LeadData {
            status: true,
            d_rel,
            v_rel: v_lead - v_ego,
            v_lead,
        }
    }

    fn all_flags() -> FollowParams {
        FollowParams {
            increased_stopping_distance_m: 3.0,
            aggressive_acceleration: true,
            aggressive_acceleration_experimental: true,
            smoother_braking: true,
            smoother_braking_far_lead: true,
            smoother_braking_jerk: true,
        }
    }

    #[test]
    fn test_no_flags_no_change() {
        let params = FollowParams::default();

        for (d_rel, v_lead) in [(50.0, 25.0), (15.0, 10.0), (30.0, 20.0)].iter() {
            let adj = adjust_follow(BASE, false, 20.0, &lead(*d_rel, *v_lead, 20.0), &params);
            assert_eq!(adj.values, BASE);
            assert_eq!(adj.acceleration_offset, None);
            assert_eq!(adj.braking_offset, None);
        }
    }

    #[test]
    fn test_faster_lead_experimental() {
        let params = FollowParams {
            aggressive_acceleration_experimental: true,
            ..FollowParams::default()
        };

        let adj = adjust_follow(BASE, false, 20.0, &lead(50.0, 25.0, 20.0), &params);

        // distance factor 50 - 20 * 1.5 = 20, offset 5 - 2.5 = 2.5
        assert_eq!(adj.acceleration_offset, Some(2.5));
        assert!((adj.values.t_follow - 0.6).abs() < 1e-12);
        assert!((adj.values.acceleration_jerk - 0.4).abs() < 1e-12);
        assert!((adj.values.speed_jerk - 0.4).abs() < 1e-12);
        assert!(adj.values.t_follow < BASE.t_follow);
        assert!(adj.values.acceleration_jerk < BASE.acceleration_jerk);
        assert!(adj.values.t_follow > 0.0);
    }

    #[test]
    fn test_faster_lead_light_touch() {
        let params = FollowParams {
            aggressive_acceleration: true,
            ..FollowParams::default()
        };

        let adj = adjust_follow(BASE, false, 20.0, &lead(50.0, 25.0, 20.0), &params);

        // distance factor 50 - 25 * 1.5 = 12.5, offset 5 - 2.5 = 2.5, jerk
        // untouched
        assert_eq!(adj.acceleration_offset, Some(2.5));
        assert!((adj.values.t_follow - 0.6).abs() < 1e-12);
        assert_eq!(adj.values.acceleration_jerk, BASE.acceleration_jerk);
        assert_eq!(adj.values.speed_jerk, BASE.speed_jerk);
    }

    #[test]
    fn test_light_touch_standstill_offset() {
        let params = FollowParams {
            aggressive_acceleration: true,
            ..FollowParams::default()
        };

        // Pulling away from a stop: standstill offset is 6 - 1^2.5 = 5, so the
        // offset is 3 + 5 - 2.5 = 5.5, below the 40 - 4 * 1.5 = 34 ceiling
        let adj = adjust_follow(BASE, false, 1.0, &lead(40.0, 4.0, 1.0), &params);
        assert_eq!(adj.acceleration_offset, Some(5.5));
        assert!((adj.values.t_follow - 1.5 / 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_experimental_takes_precedence() {
        let params = FollowParams {
            aggressive_acceleration: true,
            aggressive_acceleration_experimental: true,
            ..FollowParams::default()
        };

        let adj = adjust_follow(BASE, false, 20.0, &lead(50.0, 25.0, 20.0), &params);

        // Only the experimental variant ran, so the jerks were divided once
        assert!((adj.values.acceleration_jerk - 0.4).abs() < 1e-12);
        assert!((adj.values.t_follow - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_slower_lead_smoother_braking() {
        let params = FollowParams {
            smoother_braking: true,
            ..FollowParams::default()
        };
        let base = FollowValues {
            t_follow: 1.25,
            ..BASE
        };

        let adj = adjust_follow(base, false, 20.0, &lead(15.0, 10.0, 20.0), &params);

        // distance factor 15 - 10 * 1.25 = 2.5, offset clamp(10 - 2.5) = 2.5
        assert_eq!(adj.braking_offset, Some(2.5));
        assert!((adj.values.t_follow - 0.5).abs() < 1e-12);
        assert!(adj.values.t_follow < base.t_follow);
        assert_eq!(adj.values.acceleration_jerk, base.acceleration_jerk);
        assert_eq!(adj.acceleration_offset, None);
    }

    #[test]
    fn test_slower_lead_jerk_caps() {
        let params = FollowParams {
            smoother_braking: true,
            smoother_braking_jerk: true,
            ..FollowParams::default()
        };
        let base = FollowValues {
            t_follow: 1.25,
            ..BASE
        };

        let adj = adjust_follow(base, false, 20.0, &lead(15.0, 10.0, 20.0), &params);

        // Offset 2.5, capped at 1.25 for acceleration jerk and not capped
        // (limit 5) for speed jerk
        assert!((adj.values.acceleration_jerk - 1.25).abs() < 1e-12);
        assert!((adj.values.speed_jerk - 2.5).abs() < 1e-12);

        // A huge offset still only scales by the caps
        let far = adjust_follow(base, false, 40.0, &lead(400.0, 5.0, 40.0), &params);
        let offset = far.braking_offset.unwrap();
        assert!(offset > COMFORT_BRAKE_MSS * 2.0);
        assert!((far.values.acceleration_jerk - COMFORT_BRAKE_MSS / 2.0).abs() < 1e-12);
        assert!((far.values.speed_jerk - COMFORT_BRAKE_MSS * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_far_lead_offset() {
        let base = FollowValues {
            t_follow: 1.45,
            ..BASE
        };
        let near_only = FollowParams {
            smoother_braking: true,
            ..FollowParams::default()
        };
        let with_far = FollowParams {
            smoother_braking_far_lead: true,
            ..near_only
        };
        let lead = lead(150.0, 28.0, 30.0);

        // Closing slowly on a distant lead: without the far lead offset the
        // raw offset is 2 - 2.5 which clamps to 1
        let adj = adjust_follow(base, false, 30.0, &lead, &near_only);
        assert_eq!(adj.braking_offset, Some(1.0));
        assert_eq!(adj.values.t_follow, base.t_follow);

        // Above city speed the distance offset is -5 m, so the lead distance
        // is 155 m and the stopping distance 1 m. Far lead offset is
        // 155 - 43.5 - 1 + 3 = 113.5, giving 2 + 113.5 - 2.5 = 113 below the
        // 155 - 28 * 1.45 = 114.4 ceiling
        let adj = adjust_follow(base, false, 30.0, &lead, &with_far);
        let offset = adj.braking_offset.unwrap();
        assert!((offset - 113.0).abs() < 1e-9);
        assert!((adj.values.t_follow - 1.45 / 113.0).abs() < 1e-12);
    }

    #[test]
    fn test_traffic_mode_ignores_stopping_distance() {
        let params = FollowParams {
            increased_stopping_distance_m: 10.0,
            aggressive_acceleration_experimental: true,
            ..FollowParams::default()
        };
        let l = lead(50.0, 25.0, 20.0);

        let traffic = adjust_follow(BASE, true, 20.0, &l, &params);
        let normal = adjust_follow(BASE, false, 20.0, &l, &params);

        // Traffic mode sees the full 50 m and normal mode only 40 m, but both
        // ceilings are well above the raw offset of 2.5
        assert_eq!(traffic.acceleration_offset, Some(2.5));
        assert_eq!(normal.acceleration_offset, Some(2.5));

        // Close in, the distance ceiling differs: 32 - 30 = 2 vs 22 - 30 -> 1
        let close = lead(32.0, 25.0, 20.0);
        let traffic = adjust_follow(BASE, true, 20.0, &close, &params);
        let normal = adjust_follow(BASE, false, 20.0, &close, &params);
        assert_eq!(traffic.acceleration_offset, Some(2.0));
        assert_eq!(normal.acceleration_offset, Some(1.0));
    }

    #[test]
    fn test_cut_in_floors_at_one() {
        let params = all_flags();

        for d_rel in [-5.0, 0.0, 0.5].iter() {
            for v_lead in [5.0, 30.0].iter() {
                let adj = adjust_follow(BASE, false, 20.0, &lead(*d_rel, *v_lead, 20.0), &params);
                for offset in adj.acceleration_offset.iter().chain(adj.braking_offset.iter()) {
                    assert_eq!(*offset, 1.0);
                }
                assert_eq!(adj.values.t_follow, BASE.t_follow);
            }
        }
    }

    #[test]
    fn test_boundedness() {
        let params = all_flags();

        for v_ego_i in 0..=40 {
            let v_ego = v_ego_i as f64;
            for v_lead_i in 0..=40 {
                let v_lead = v_lead_i as f64;
                for d_i in 0..=30 {
                    let d_rel = d_i as f64 * 5.0 - 10.0;
                    for traffic in [false, true].iter() {
                        let adj = adjust_follow(
                            BASE,
                            *traffic,
                            v_ego,
                            &lead(d_rel, v_lead, v_ego),
                            &params,
                        );

                        for offset in adj.acceleration_offset.iter().chain(adj.braking_offset.iter()) {
                            assert!(*offset >= 1.0 && offset.is_finite());
                        }

                        let v = adj.values;
                        assert!(v.t_follow > 0.0 && v.t_follow.is_finite());
                        assert!(v.t_follow <= BASE.t_follow);
                        assert!(v.acceleration_jerk > 0.0 && v.acceleration_jerk.is_finite());
                        assert!(v.speed_jerk > 0.0 && v.speed_jerk.is_finite());
                    }
                }
            }
        }
    }

    #[test]
    fn test_validation() {
        assert!(all_flags().validate().is_ok());

        let params = FollowParams {
            increased_stopping_distance_m: -1.0,
            ..FollowParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(LongPlanError::NegativeParam { .. })
        ));
    }
}
