//! Main planner executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Load parameters and initialise LongPlan
//!     - Main loop:
//!         - Input acquisition from the replay
//!         - LongPlan processing of every frame due this cycle
//!         - Archive writing
//!         - Cycle management
//!
//! # Modules
//!
//! All modules (e.g. `long_plan`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::msg::PlannerFrame;
use plan_lib::{
    data_store::DataStore,
    long_plan::{InitData, LongPlan, Params, VehicleCaps},
};
use util::{
    archive::Archived,
    logger::{logger_init, LogLevels},
    module::State,
    replay::{Pending, Replay},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Run the longitudinal planner against a recorded replay.
#[derive(Debug, StructOpt)]
#[structopt(name = "plan_exec")]
struct Opt {
    /// Path to the replay file of timestamped planner frames
    #[structopt(parse(from_os_str))]
    replay: PathBuf,

    /// Planner parameter file, relative to the params directory
    #[structopt(long, default_value = "long_plan.toml")]
    params: String,

    /// Vehicle capabilities file, relative to the params directory
    #[structopt(long, default_value = "vehicle.toml")]
    vehicle: String,

    /// Do not write archives for this session
    #[structopt(long)]
    no_archive: bool,

    /// Print debug (-v) or trace (-vv) messages to the terminal
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("plan_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(&LogLevels::with_verbosity(opt.verbose), &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Longitudinal Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: Params = util::params::load(&opt.params)
        .wrap_err_with(|| format!("Could not load planner params from {}", opt.params))?;
    let caps: VehicleCaps = util::params::load(&opt.vehicle)
        .wrap_err_with(|| format!("Could not load vehicle params from {}", opt.vehicle))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut long_plan =
        LongPlan::init(InitData { params, caps }).wrap_err("Failed to initialise LongPlan")?;

    if !opt.no_archive {
        long_plan
            .enable_archiving(&session)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))
            .wrap_err("Failed to create the LongPlan archives")?;
    }
    info!("LongPlan init complete");

    let mut ds = DataStore::new(long_plan);

    info!("Module initialisation complete\n");

    // ---- LOAD REPLAY ----

    info!("Loading replay from {:?}", opt.replay);

    let mut replay: Replay<PlannerFrame> =
        Replay::new(&opt.replay).wrap_err("Failed to load replay")?;

    info!(
        "Loaded replay lasts {:.02} s and contains {} frames\n",
        replay.get_duration(),
        replay.get_num_frames()
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ, session::get_elapsed_seconds());

        // ---- DATA INPUT ----

        let frames = match replay.get_pending(ds.session_time_s) {
            Pending::None => vec![],
            Pending::Some(frames) => frames,
            Pending::EndOfReplay => {
                info!("End of replay reached, stopping");
                break;
            }
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        for frame in frames.iter() {
            match ds.long_plan.proc(frame) {
                Ok((o, r)) => {
                    ds.long_plan_output = Some(o);
                    ds.record_status(r);
                }
                Err(e) => match e {},
            }

            // ---- WRITE ARCHIVES ----

            if let Err(e) = ds.long_plan.write() {
                warn!("Could not write LongPlan archives: {}", e);
            }
        }

        if let Some(o) = ds.long_plan_output {
            trace!("LongPlan published: {:?}", o);
        }

        if ds.is_1_hz_cycle {
            if let Some(o) = ds.long_plan.last_published() {
                debug!(
                    "t_follow = {:.3} s, accel = [{:.3}, {:.3}], v_cruise = {:.2} m/s",
                    o.t_follow, o.min_acceleration, o.max_acceleration, o.v_cruise
                );
            }

            if let Some((n, anomalies)) = ds.take_anomaly_summary() {
                warn!(
                    "{} LongPlan report(s) flagged anomalies in the last second, latest: {}",
                    n,
                    anomalies.join(", ")
                );
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
