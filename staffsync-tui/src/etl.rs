//! ETL trigger and post-sync refresh sequencing.
//!
//! ```text
//! Idle -> Triggering -> (ack) -> Waiting -> Refreshing -> Idle
//! Idle -> Triggering -> (reject / failure) -> Idle
//! ```
//!
//! A trigger while not `Idle` is rejected without a request. The refresh
//! re-reads the dependent views in a fixed order, each step completing
//! before the next starts.

use crate::api_client::ApiClient;
use crate::cache::{EmployeeCache, Page, PageCursor};
use crate::stats::StatsPanel;
use serde_json::Value;
use staffsync_core::{Envelope, Transport, UnifiedEmployee};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtlPhase {
    Idle,
    Triggering,
    Waiting { until: Instant },
    Refreshing,
}

impl EtlPhase {
    pub fn name(&self) -> &'static str {
        match self {
            EtlPhase::Idle => "idle",
            EtlPhase::Triggering => "triggering",
            EtlPhase::Waiting { .. } => "waiting",
            EtlPhase::Refreshing => "refreshing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EtlError {
    #[error("A synchronization is already {phase}")]
    Busy { phase: &'static str },
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStep {
    UnifiedStats,
    SourceStats,
    LastSync,
    UnifiedEmployees,
}

impl RefreshStep {
    pub const ORDER: [RefreshStep; 4] = [
        RefreshStep::UnifiedStats,
        RefreshStep::SourceStats,
        RefreshStep::LastSync,
        RefreshStep::UnifiedEmployees,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RefreshStep::UnifiedStats => "unified statistics",
            RefreshStep::SourceStats => "source statistics",
            RefreshStep::LastSync => "last synchronization",
            RefreshStep::UnifiedEmployees => "unified employees",
        }
    }
}

impl fmt::Display for RefreshStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: RefreshStep,
    pub error: Option<String>,
}

/// Outcome of every step of one post-sync refresh, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub steps: Vec<StepOutcome>,
}

impl RefreshReport {
    pub fn order(&self) -> Vec<RefreshStep> {
        self.steps.iter().map(|s| s.step).collect()
    }

    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.error.is_none())
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}

pub struct EtlSequencer {
    phase: EtlPhase,
    wait: Duration,
    completed_runs: u64,
}

impl EtlSequencer {
    pub fn new(wait: Duration) -> Self {
        Self {
            phase: EtlPhase::Idle,
            wait,
            completed_runs: 0,
        }
    }

    pub fn phase(&self) -> EtlPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == EtlPhase::Idle
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    /// `Idle -> Triggering`, or `Busy` in any other phase.
    pub fn begin_trigger(&mut self) -> Result<(), EtlError> {
        if self.phase != EtlPhase::Idle {
            return Err(EtlError::Busy {
                phase: self.phase.name(),
            });
        }
        self.phase = EtlPhase::Triggering;
        Ok(())
    }

    /// Resolve the trigger call: an ack starts the wait, anything else
    /// returns to `Idle` with the backend message.
    pub fn acknowledge(&mut self, envelope: Envelope<Value>) -> Result<Instant, EtlError> {
        if self.phase != EtlPhase::Triggering {
            return Err(EtlError::Busy {
                phase: self.phase.name(),
            });
        }
        if envelope.is_success() {
            let until = Instant::now() + self.wait;
            self.phase = EtlPhase::Waiting { until };
            tracing::info!(wait_ms = self.wait.as_millis() as u64, "ETL acknowledged");
            Ok(until)
        } else {
            self.phase = EtlPhase::Idle;
            tracing::warn!(error = %envelope.message, "ETL trigger rejected");
            Err(EtlError::Rejected(envelope.message))
        }
    }

    /// Time left before the refresh may start.
    pub fn remaining(&self) -> Option<Duration> {
        match self.phase {
            EtlPhase::Waiting { until } => Some(until.saturating_duration_since(Instant::now())),
            _ => None,
        }
    }

    pub fn ready_to_refresh(&self) -> bool {
        matches!(self.phase, EtlPhase::Waiting { until } if Instant::now() >= until)
    }

    /// `Waiting -> Refreshing` once the deadline has passed.
    pub fn begin_refresh(&mut self) -> bool {
        if self.ready_to_refresh() {
            self.phase = EtlPhase::Refreshing;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self) {
        if self.phase == EtlPhase::Refreshing {
            self.completed_runs += 1;
        }
        self.phase = EtlPhase::Idle;
    }
}

/// State re-read after a synchronization.
pub struct RefreshTargets<'a> {
    pub stats: &'a mut StatsPanel,
    pub cache: &'a mut EmployeeCache,
    pub preview: &'a mut PageCursor,
    pub preview_page: &'a mut Page<UnifiedEmployee>,
}

/// Run the four refresh steps strictly in order. A failed step is recorded
/// and the remaining steps still run; completed steps are not rolled back.
pub async fn refresh_sequence<T: Transport>(
    api: &ApiClient<T>,
    targets: RefreshTargets<'_>,
) -> RefreshReport {
    let RefreshTargets {
        stats,
        cache,
        preview,
        preview_page,
    } = targets;
    let mut report = RefreshReport::default();

    for step in RefreshStep::ORDER {
        tracing::debug!(step = step.label(), "Refresh step started");
        let error = match step {
            RefreshStep::UnifiedStats => stats.load_unified_stats(api, true).await.summary(),
            RefreshStep::SourceStats => stats.load_source_stats(api, true).await.summary(),
            RefreshStep::LastSync => stats.load_last_sync(api).await.summary(),
            RefreshStep::UnifiedEmployees => {
                cache.invalidate();
                preview.reset();
                match cache.get_page(api, 0).await {
                    Ok(page) => {
                        preview.sync(&page);
                        *preview_page = page;
                        None
                    }
                    Err(message) => {
                        *preview_page = Page::NoRecords;
                        Some(message)
                    }
                }
            }
        };
        report.steps.push(StepOutcome { step, error });
    }
    report
}
