//! Implementations for the LongPlan state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::{
    adjust_follow, aggregate, resolve_baseline, select_envelope, validate_tables, AccelLimits,
    CondExpContext, CondExpDecider, CruiseContext, CruiseTargetProvider, FollowValues,
    LongPlanError, NoCondExp, Params, Personality, VehicleCaps, A_CHANGE_COST, CRUISING_SPEED_MS,
    J_EGO_COST,
};
use comms_if::msg::{LeadData, LongPlanMsg, PlannerFrame};
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Longitudinal planning module state
pub struct LongPlan {
    pub(crate) params: Params,
    pub(crate) caps: VehicleCaps,

    /// Parameters to swap in at the start of the next cycle
    pending_params: Option<Params>,

    cond_exp: Box<dyn CondExpDecider>,
    cruise_targets: Vec<Box<dyn CruiseTargetProvider>>,

    pub(crate) lead_one: LeadData,
    pub(crate) limits: Option<AccelLimits>,
    pub(crate) base: Option<FollowValues>,
    pub(crate) follow: Option<FollowValues>,

    /// Last decision of the conditional experimental decider, held while the
    /// feature is disabled
    pub(crate) conditional_experimental: bool,

    pub(crate) report: StatusReport,
    pub(crate) output: Option<LongPlanMsg>,

    archives: Option<Archives>,
}

/// Data required to initialise LongPlan.
#[derive(Debug, Clone, Copy)]
pub struct InitData {
    pub params: Params,
    pub caps: VehicleCaps,
}

/// Status report for LongPlan processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// `v_ego` was negative or not finite and has been clamped to zero
    pub v_ego_clamped: bool,

    /// The personality code was unknown and the standard personality was used
    pub personality_fallback: bool,

    /// The lead was tracked but its kinematics were not finite
    pub lead_rejected: bool,

    /// The follow adjustment ran this cycle
    pub follow_adjusted: bool,

    /// The selected envelope did not bracket zero and the vehicle limits were
    /// used instead
    pub envelope_fallback: bool,

    /// New parameters were applied at the start of this cycle
    pub params_reloaded: bool,

    /// Divisor applied for a faster lead
    pub acceleration_offset: Option<f64>,

    /// Divisor applied for a slower lead
    pub braking_offset: Option<f64>,
}

/// Archive files for LongPlan, only created when archiving is enabled.
struct Archives {
    report: Archiver,
    limits: Archiver,
    base: Archiver,
    follow: Archiver,
    output: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LongPlan {
    type InitData = InitData;
    type InitError = LongPlanError;

    type InputData = PlannerFrame;
    type OutputData = LongPlanMsg;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the LongPlan module.
    ///
    /// Parameters and vehicle capabilities are validated here, so no
    /// configuration error can occur during cyclic processing.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        validate_tables()?;
        init_data.params.validate()?;
        init_data.caps.validate()?;

        info!(
            "LongPlan initialised with {:?} acceleration and {:?} deceleration profiles",
            init_data.params.profile.acceleration, init_data.params.profile.deceleration
        );

        Ok(Self {
            params: init_data.params,
            caps: init_data.caps,
            pending_params: None,
            cond_exp: Box::new(NoCondExp),
            cruise_targets: Vec::new(),
            lead_one: LeadData::default(),
            limits: None,
            base: None,
            follow: None,
            conditional_experimental: false,
            report: StatusReport::default(),
            output: None,
            archives: None,
        })
    }

    /// Perform cyclic processing of LongPlan.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Swap in any parameters requested since the last cycle
        if let Some(params) = self.pending_params.take() {
            self.params = params;
            self.report.params_reloaded = true;
            info!("LongPlan parameters reloaded");
        }

        let car_state = input_data.car_state;
        let controls_state = input_data.controls_state;

        // ---- SNAPSHOT ----

        let v_ego = self.sanitise_v_ego(car_state.v_ego);
        self.lead_one = input_data.radar_state.lead_one;

        // ---- ENVELOPE ----

        let limits = self.checked_limits(select_envelope(
            v_ego,
            self.params.profile.acceleration,
            self.params.profile.deceleration,
            controls_state.experimental_mode,
            &self.caps,
        ));

        // ---- BASELINE ----

        let personality = match Personality::from_code(controls_state.personality) {
            Some(p) => p,
            None => {
                debug!(
                    "Unknown personality code {}, using standard",
                    controls_state.personality
                );
                self.report.personality_fallback = true;
                Personality::Standard
            }
        };

        let base = resolve_baseline(
            input_data.traffic_mode_active,
            v_ego,
            personality,
            &self.params.personality,
            &self.params.traffic_mode,
        );

        // ---- FOLLOW ----

        let follow = if self.lead_usable() {
            let adj = adjust_follow(
                base,
                input_data.traffic_mode_active,
                v_ego,
                &self.lead_one,
                &self.params.follow,
            );
            self.report.follow_adjusted = true;
            self.report.acceleration_offset = adj.acceleration_offset;
            self.report.braking_offset = adj.braking_offset;
            adj.values
        } else {
            base
        };

        // ---- CRUISE ----

        let road_curvature = match input_data.road_curvature.is_finite() {
            true => input_data.road_curvature,
            false => 0.0,
        };

        let ctx = CruiseContext::new(&car_state, &controls_state, v_ego, road_curvature);
        let candidates: Vec<f64> = self
            .cruise_targets
            .iter_mut()
            .map(|provider| {
                let target = provider.target_ms(&ctx);
                trace!("Cruise target from {}: {:.2} m/s", provider.name(), target);
                target
            })
            .collect();
        let v_cruise = aggregate(ctx.v_cruise, &candidates, CRUISING_SPEED_MS);

        // ---- CONDITIONAL EXPERIMENTAL ----

        if self.params.conditional_experimental_mode {
            self.conditional_experimental = self.cond_exp.update(&CondExpContext {
                car_state,
                enabled: controls_state.enabled,
                lead_one: self.lead_one,
                road_curvature,
                t_follow: follow.t_follow,
                v_ego,
            });
        }

        // ---- PUBLISH ----

        let output = LongPlanMsg {
            acceleration_jerk: follow.acceleration_jerk * A_CHANGE_COST,
            acceleration_jerk_stock: base.acceleration_jerk * A_CHANGE_COST,
            speed_jerk: follow.speed_jerk * J_EGO_COST,
            speed_jerk_stock: base.speed_jerk * J_EGO_COST,
            conditional_experimental: self.conditional_experimental,
            max_acceleration: limits.max_accel,
            min_acceleration: limits.min_accel,
            t_follow: follow.t_follow,
            v_cruise,
            road_curvature,
            valid: input_data.valid,
        };

        trace!(
            "LongPlan output:\n    accel: [{:.3}, {:.3}]\n    t_follow: {:.3}\n    v_cruise: {:.2}",
            output.min_acceleration,
            output.max_acceleration,
            output.t_follow,
            output.v_cruise
        );

        self.limits = Some(limits);
        self.base = Some(base);
        self.follow = Some(follow);
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for LongPlan {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let arch = match self.archives.as_mut() {
            Some(a) => a,
            None => return Ok(()),
        };

        // Write each one individually
        arch.report.serialise(self.report)?;
        arch.limits.serialise(self.limits)?;
        arch.base.serialise(self.base)?;
        arch.follow.serialise(self.follow)?;
        arch.output.serialise(self.output)?;

        Ok(())
    }
}

impl StatusReport {
    /// Names of the input or configuration anomalies flagged in this report.
    pub fn anomalies(&self) -> Vec<&'static str> {
        [
            (self.v_ego_clamped, "v_ego_clamped"),
            (self.personality_fallback, "personality_fallback"),
            (self.lead_rejected, "lead_rejected"),
            (self.envelope_fallback, "envelope_fallback"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect()
    }
}

impl LongPlan {
    /// Replace the conditional experimental mode decider.
    pub fn with_cond_exp<D>(mut self, decider: D) -> Self
    where
        D: CondExpDecider + 'static,
    {
        self.cond_exp = Box::new(decider);
        self
    }

    /// Register a cruise target provider. Providers are queried in
    /// registration order.
    pub fn add_cruise_target<P>(&mut self, provider: P)
    where
        P: CruiseTargetProvider + 'static,
    {
        info!("Registered cruise target provider {}", provider.name());
        self.cruise_targets.push(Box::new(provider));
    }

    /// Validate new parameters and apply them at the start of the next cycle.
    ///
    /// On error the current parameters remain in use.
    pub fn request_reload(&mut self, params: Params) -> Result<(), LongPlanError> {
        match params.validate() {
            Ok(()) => {
                self.pending_params = Some(params);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected LongPlan parameter reload: {}", e);
                Err(e)
            }
        }
    }

    /// A copy of the last published record, or `None` before the first
    /// cycle.
    pub fn last_published(&self) -> Option<LongPlanMsg> {
        self.output
    }

    /// Parameters in use for the current cycle.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Start writing archives into the session's archive directory.
    pub fn enable_archiving(&mut self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        self.archives = Some(Archives {
            report: Archiver::from_path(session, "long_plan/status_report.csv")?,
            limits: Archiver::from_path(session, "long_plan/limits.csv")?,
            base: Archiver::from_path(session, "long_plan/base.csv")?,
            follow: Archiver::from_path(session, "long_plan/follow.csv")?,
            output: Archiver::from_path(session, "long_plan/output.csv")?,
        });

        Ok(())
    }

    /// Floor the ego speed at zero, treating NaN as zero.
    fn sanitise_v_ego(&mut self, v_ego: f64) -> f64 {
        if v_ego.is_finite() && v_ego >= 0.0 {
            v_ego
        } else {
            debug!("Clamping v_ego of {} to 0", v_ego);
            self.report.v_ego_clamped = true;
            0.0
        }
    }

    /// True if the lead should be used for the follow adjustment.
    fn lead_usable(&mut self) -> bool {
        if !self.lead_one.status || !self.caps.long_control_available {
            return false;
        }

        if self.lead_one.d_rel.is_finite() && self.lead_one.v_lead.is_finite() {
            true
        } else {
            debug!("Rejecting lead with non-finite kinematics: {:?}", self.lead_one);
            self.report.lead_rejected = true;
            false
        }
    }

    /// Replace limits which do not bracket zero by the vehicle's limits.
    pub(crate) fn checked_limits(&mut self, limits: AccelLimits) -> AccelLimits {
        if limits.is_valid() {
            limits
        } else {
            warn!(
                "Acceleration envelope {:?} does not bracket zero, using vehicle limits",
                limits
            );
            self.report.envelope_fallback = true;
            AccelLimits {
                min_accel: self.caps.accel_min,
                max_accel: self.caps.accel_max,
            }
        }
    }
}
