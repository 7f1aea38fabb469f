use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::dispatch::ContactDispatcher;
use crate::escalation::{EscalationCheck, EscalationMonitor};
use crate::store::{IncidentStore, StoreError};
use crate::triage::TriageError;

#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub flagged: Vec<EscalationCheck>,
    pub dispatched: usize,
    pub failures: usize,
}

/// One escalation sweep: scan for stalled incidents, mark each Escalated and
/// hand it to the dispatcher. A failure on one incident is logged and the
/// sweep moves on; only the scan itself failing aborts the run.
pub async fn run_escalation_sweep(
    monitor: &EscalationMonitor,
    incidents: &Arc<dyn IncidentStore>,
    dispatcher: &ContactDispatcher,
) -> Result<SweepOutcome, StoreError> {
    let flagged = monitor.scan().await?;
    let mut dispatched = 0usize;
    let mut failures = 0usize;

    for check in &flagged {
        info!(
            incident_id = %check.incident_id,
            hours_idle = check.hours_idle,
            "incident stalled past threshold, escalating"
        );

        if let Err(e) = incidents.mark_escalated(check.incident_id).await {
            error!(incident_id = %check.incident_id, "failed to mark escalated: {}", e);
            failures += 1;
            continue;
        }
        crate::metrics::increment_escalations();

        match dispatcher.dispatch(check.incident_id).await {
            Ok(report) => {
                if report.contacted == 0 && report.failed == 0 {
                    info!(incident_id = %check.incident_id, "no responders on duty, left escalated");
                } else {
                    dispatched += 1;
                }
            }
            Err(TriageError::NotFound(id)) => {
                // Deleted between scan and dispatch; nothing to do.
                error!(incident_id = %id, "incident vanished during sweep");
                failures += 1;
            }
            Err(e) => {
                error!(incident_id = %check.incident_id, "dispatch failed: {}", e);
                failures += 1;
            }
        }
    }

    metrics::gauge!("dogwatch_escalation_flagged").set(flagged.len() as f64);
    info!(
        flagged = flagged.len(),
        dispatched, failures, "escalation sweep completed"
    );

    Ok(SweepOutcome {
        flagged,
        dispatched,
        failures,
    })
}

/// Periodic in-process scheduler around the sweep, for deployments without
/// an external cron. Spawned once; runs until the process exits.
pub async fn start_escalation_worker(
    monitor: Arc<EscalationMonitor>,
    incidents: Arc<dyn IncidentStore>,
    dispatcher: Arc<ContactDispatcher>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        info!("Escalation worker started (every {}s)", interval_secs);
        loop {
            if let Err(e) = run_escalation_sweep(&monitor, &incidents, &dispatcher).await {
                error!("escalation sweep failed: {}", e);
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(interval_secs)).await;
        }
    });
}
