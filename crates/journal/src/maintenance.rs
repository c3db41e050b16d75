//! Journal receiver maintenance run
//!
//! One run resolves the cutoff, loads the receiver chain, classifies it and,
//! when enabled, deletes every receiver older than the boundary, oldest
//! first, stopping at the first failed delete.

use crate::cutoff::resolve_cutoff;
use crate::directory::load_chain;
use crate::error::{ExitStatus, MaintError};
use crate::receiver::{CanonicalTimestamp, JournalId, ObjectName, Receiver};
use crate::report::{ReportSink, Reporter};
use crate::retention::{classify, RetentionPlan, Verdict};
use crate::system::JournalSystem;
use tracing::{debug, info, warn};

/// Where report lines are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Timestamped lines on the operator console (`*PRINT`)
    Print,
    /// Informational messages on the queue manager message queue (`*MSGQ`)
    MessageQueue,
}

/// Immutable settings for one maintenance run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Journal whose receiver chain is maintained
    pub journal: JournalId,
    /// User space holding the oldest-entry record
    pub info_space: ObjectName,
    pub output: OutputMode,
    /// Delete receivers older than the boundary (`*YES`) or only report them (`*NO`)
    pub delete_receivers: bool,
}

/// Progress of a maintenance run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    BoundaryFound,
    NoBoundary,
    Deleting,
    ReportOnly,
    Done,
    HaltedOnError,
    /// Ended by a fatal error before classification finished
    Aborted,
}

/// Result of the deletion pass
#[derive(Debug, Default)]
pub struct DeletionOutcome {
    /// Receivers deleted, in deletion order
    pub deleted: Vec<ObjectName>,
    /// The failed delete that halted the pass
    pub failure: Option<MaintError>,
}

/// Everything a finished run knows
#[derive(Debug)]
pub struct RunSummary {
    pub state: RunState,
    /// Every state entered, in order
    pub history: Vec<RunState>,
    pub cutoff: Option<CanonicalTimestamp>,
    pub chain: Vec<Receiver>,
    pub plan: Option<RetentionPlan>,
    pub deleted: Vec<ObjectName>,
    pub error: Option<MaintError>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
            history: vec![RunState::Idle],
            cutoff: None,
            chain: Vec::new(),
            plan: None,
            deleted: Vec::new(),
            error: None,
        }
    }

    fn enter(&mut self, state: RunState) {
        self.state = state;
        self.history.push(state);
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.error
            .as_ref()
            .map_or(ExitStatus::Success, MaintError::exit_status)
    }
}

/// Delete every receiver before `boundary`, oldest first
///
/// Stops at the first non-zero status; receivers after the failed one are
/// not attempted.
pub fn delete_before_boundary(
    system: &dyn JournalSystem,
    chain: &[Receiver],
    boundary: Option<usize>,
    reporter: &mut Reporter<'_>,
) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();
    let Some(boundary) = boundary else {
        return outcome;
    };

    for receiver in &chain[..boundary] {
        reporter.line(format!(
            "Deleting Receiver {:<10} attached at: {}",
            receiver.name, receiver.attached_at
        ));

        if let Err(status) = system.delete_receiver(&receiver.library, &receiver.name) {
            warn!("DLTJRNRCV {}/{} failed with status {}", receiver.library, receiver.name, status);
            reporter.line(format!(
                "ERROR: {} from DLTJRNRCV.  See job log for details",
                status
            ));
            outcome.failure = Some(MaintError::DeleteFailed {
                receiver: receiver.name,
                status,
            });
            break;
        }

        debug!("Deleted receiver {}", receiver.name);
        outcome.deleted.push(receiver.name);
    }

    outcome
}

/// Report the classification newest first
///
/// With deletion enabled the trace stops at the boundary; older receivers
/// are narrated by the deletion pass.
fn report_plan(chain: &[Receiver], plan: &RetentionPlan, reporter: &mut Reporter<'_>) {
    for index in plan.scan_order() {
        let receiver = &chain[index];
        match plan.verdicts[index] {
            Verdict::KeepAfterCutoff => {
                reporter.line(format!(
                    "Keeping receiver: {:<10} attached at: {}",
                    receiver.name, receiver.attached_at
                ));
            }
            Verdict::KeepBoundary => {
                reporter.line(format!(
                    "Keeping receiver: {:<10} attached at: {}",
                    receiver.name, receiver.attached_at
                ));
                reporter.line(format!(
                    "** {:<10} is the oldest *JRNRCV that we need to keep **",
                    receiver.name
                ));
            }
            Verdict::KeepStale => {
                reporter.line(format!(
                    "Receiver {:<10} attached at: {} can be deleted",
                    receiver.name, receiver.attached_at
                ));
            }
            Verdict::Delete => break,
        }
    }
}

/// A single maintenance run over one journal
pub struct Maintenance<'a> {
    system: &'a dyn JournalSystem,
    config: RunConfig,
}

impl<'a> Maintenance<'a> {
    pub fn new(system: &'a dyn JournalSystem, config: RunConfig) -> Self {
        Self { system, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run maintenance, narrating every decision to `sink`
    ///
    /// Always ends with the `JrnMaint finished` summary line.
    pub fn run(&self, sink: &mut dyn ReportSink) -> RunSummary {
        let mut reporter = Reporter::new(sink);
        let mut summary = RunSummary::new();

        reporter.line("*****************************************************");
        reporter.line("*   Starting JrnMaint journal maintenance program   *");
        reporter.line("*****************************************************");

        if let Err(e) = self.execute(&mut reporter, &mut summary) {
            warn!("Journal maintenance for {} ended early: {}", self.config.journal, e);
            reporter.line(format!("ERROR: {}", e));
            summary.enter(RunState::Aborted);
            summary.error = Some(e);
        }

        reporter.line(format!(
            "JrnMaint finished - {} receiver(s) have been deleted.",
            summary.deleted_count()
        ));
        if reporter.failures() > 0 {
            warn!("{} report line(s) could not be delivered", reporter.failures());
        }
        summary
    }

    fn execute(&self, reporter: &mut Reporter<'_>, summary: &mut RunSummary) -> Result<(), MaintError> {
        let journal = &self.config.journal;
        info!(
            "Starting maintenance of {} (delete receivers: {})",
            journal, self.config.delete_receivers
        );

        if !self.system.library_exists(&journal.library) {
            return Err(MaintError::JournalContainerNotFound(journal.library));
        }

        let cutoff = resolve_cutoff(self.system, &self.config.info_space, &journal.library)?;
        summary.cutoff = Some(cutoff);

        summary.chain = load_chain(self.system, journal, reporter)?;
        reporter.line(format!("Timestamp of oldest journal entry: ({})", cutoff));

        summary.enter(RunState::Scanning);
        let plan = classify(&summary.chain, &cutoff, self.config.delete_receivers);
        report_plan(&summary.chain, &plan, reporter);

        match plan.boundary {
            Some(index) => {
                debug!("Boundary receiver at index {}", index);
                summary.enter(RunState::BoundaryFound);
            }
            None => summary.enter(RunState::NoBoundary),
        }

        if !self.config.delete_receivers {
            summary.enter(RunState::ReportOnly);
            summary.enter(RunState::Done);
        } else if plan.boundary.is_some() {
            summary.enter(RunState::Deleting);
            let outcome = delete_before_boundary(self.system, &summary.chain, plan.boundary, reporter);
            summary.deleted = outcome.deleted;
            match outcome.failure {
                Some(failure) => {
                    summary.error = Some(failure);
                    summary.enter(RunState::HaltedOnError);
                }
                None => summary.enter(RunState::Done),
            }
        } else {
            summary.enter(RunState::Done);
        }

        summary.plan = Some(plan);
        info!(
            "Maintenance of {} finished: {} deleted",
            journal,
            summary.deleted_count()
        );
        Ok(())
    }
}
