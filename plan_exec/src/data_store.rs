//! # Data Store

use comms_if::msg::LongPlanMsg;

use crate::long_plan;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub session_time_s: f64,

    // LongPlan
    pub long_plan: long_plan::LongPlan,
    pub long_plan_output: Option<LongPlanMsg>,
    pub long_plan_status_rpt: long_plan::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of LongPlan reports flagging an anomaly since the last 1Hz
    /// summary
    pub num_anomalous_reports: u64,

    /// Anomalies named by the most recent anomalous report
    pub last_anomalies: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a new data store around an initialised planner.
    pub fn new(long_plan: long_plan::LongPlan) -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            session_time_s: 0.0,
            long_plan,
            long_plan_output: None,
            long_plan_status_rpt: long_plan::StatusReport::default(),
            num_consec_cycle_overruns: 0,
            num_anomalous_reports: 0,
            last_anomalies: Vec::new(),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, sets the 1Hz cycle flag and
    /// records the session time the cycle started at.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, session_time_s: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        util::logger::set_cycle(self.num_cycles as u64);

        self.long_plan_output = None;
        self.long_plan_status_rpt = long_plan::StatusReport::default();

        self.session_time_s = session_time_s;
    }

    /// Store the status report of one LongPlan run, counting it if it flags
    /// any anomaly.
    pub fn record_status(&mut self, report: long_plan::StatusReport) {
        let anomalies = report.anomalies();
        if !anomalies.is_empty() {
            self.num_anomalous_reports += 1;
            self.last_anomalies = anomalies;
        }

        self.long_plan_status_rpt = report;
    }

    /// Take the anomaly count and latest anomalies for the 1Hz summary,
    /// resetting the count. Returns `None` if no anomaly was reported.
    pub fn take_anomaly_summary(&mut self) -> Option<(u64, Vec<&'static str>)> {
        match self.num_anomalous_reports {
            0 => None,
            n => {
                self.num_anomalous_reports = 0;
                Some((n, std::mem::take(&mut self.last_anomalies)))
            }
        }
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
