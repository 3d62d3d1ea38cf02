//! Escalation tracker
//!
//! Owns the escalation records and answers aggregate questions about them.
//! All metrics are recomputed from the records on every call; nothing is
//! cached or independently mutated.

use crate::clock::{Clock, SystemClock};
use crate::execution::{EscalationExecution, EscalationId, EscalationStatus};
use chrono::Duration;
use dashmap::DashMap;
use orp_alert::Alert;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Escalation tracker errors
#[derive(Debug, thiserror::Error)]
pub enum EscalationError {
    /// No record with the given id
    #[error("escalation {0} not found")]
    NotFound(EscalationId),

    /// The record was already resolved; resolution timestamps are audit
    /// history and are never re-stamped
    #[error("escalation {0} is already resolved")]
    AlreadyResolved(EscalationId),

    /// The record was cancelled and can no longer change state
    #[error("escalation {0} is cancelled")]
    Cancelled(EscalationId),
}

/// Aggregate escalation metrics for one organization
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationMetrics {
    /// All records
    pub total: usize,
    /// Records awaiting action
    pub active: usize,
    /// Records resolved on the current day
    pub resolved_today: usize,
    /// Mean hours from escalation to resolution, over resolved records
    /// only; `None` when nothing has resolved yet
    pub average_resolution_hours: Option<f64>,
    /// Record count per escalation level, 1-indexed ascending
    pub by_level: BTreeMap<u8, usize>,
}

/// Authoritative store of escalation executions
pub struct EscalationTracker {
    records: DashMap<EscalationId, EscalationExecution>,
    clock: Arc<dyn Clock>,
}

impl EscalationTracker {
    /// Create a tracker on the wall clock
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a tracker on an injected time source
    #[inline]
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Raise an escalation for an alert
    ///
    /// The new record starts `active` and is stamped with the clock's
    /// current time.
    pub fn create(
        &self,
        alert: &Alert,
        level: u8,
        reason: impl Into<String>,
        assigned_to: impl Into<String>,
    ) -> EscalationExecution {
        let record = EscalationExecution {
            id: EscalationId::new(),
            org_id: alert.org_id.clone(),
            alert_title: alert.title.clone(),
            level,
            reason: reason.into(),
            assigned_to: assigned_to.into(),
            status: EscalationStatus::Active,
            escalated_at: self.clock.now(),
            resolved_at: None,
        };
        tracing::info!(
            escalation = %record.id,
            level,
            tier = record.tier().as_str(),
            alert = %record.alert_title,
            "escalation raised"
        );
        self.records.insert(record.id, record.clone());
        record
    }

    /// Resolve an active escalation
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    /// - `AlreadyResolved` on double-resolve
    /// - `Cancelled` if the record was withdrawn
    pub fn resolve(&self, id: EscalationId) -> Result<EscalationExecution, EscalationError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(EscalationError::NotFound(id))?;
        match entry.status {
            EscalationStatus::Resolved => Err(EscalationError::AlreadyResolved(id)),
            EscalationStatus::Cancelled => Err(EscalationError::Cancelled(id)),
            EscalationStatus::Active => {
                entry.status = EscalationStatus::Resolved;
                entry.resolved_at = Some(self.clock.now());
                tracing::info!(escalation = %id, "escalation resolved");
                Ok(entry.clone())
            }
        }
    }

    /// Withdraw an active escalation without a resolution
    ///
    /// # Errors
    /// Same discipline as `resolve`: only active records can change state.
    pub fn cancel(&self, id: EscalationId) -> Result<EscalationExecution, EscalationError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(EscalationError::NotFound(id))?;
        match entry.status {
            EscalationStatus::Resolved => Err(EscalationError::AlreadyResolved(id)),
            EscalationStatus::Cancelled => Err(EscalationError::Cancelled(id)),
            EscalationStatus::Active => {
                entry.status = EscalationStatus::Cancelled;
                tracing::info!(escalation = %id, "escalation cancelled");
                Ok(entry.clone())
            }
        }
    }

    /// Look up one record
    #[inline]
    #[must_use]
    pub fn get(&self, id: EscalationId) -> Option<EscalationExecution> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// Active records for one organization
    #[must_use]
    pub fn active(&self, org_id: &str) -> Vec<EscalationExecution> {
        self.records
            .iter()
            .filter(|entry| entry.org_id == org_id && entry.is_active())
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Aggregate metrics for one organization
    ///
    /// The resolution-time average covers exactly the resolved records;
    /// active and cancelled records are excluded from both numerator and
    /// denominator.
    #[must_use]
    pub fn metrics(&self, org_id: &str) -> EscalationMetrics {
        let today = self.clock.now().date_naive();
        let mut total = 0;
        let mut active = 0;
        let mut resolved_today = 0;
        let mut resolution_sum = Duration::zero();
        let mut resolved = 0;
        let mut by_level: BTreeMap<u8, usize> = BTreeMap::new();

        for entry in self.records.iter() {
            if entry.org_id != org_id {
                continue;
            }
            total += 1;
            *by_level.entry(entry.level).or_insert(0) += 1;
            match entry.status {
                EscalationStatus::Active => active += 1,
                EscalationStatus::Resolved => {
                    if let Some(time) = entry.resolution_time() {
                        resolved += 1;
                        resolution_sum = resolution_sum + time;
                        if entry.resolved_at.is_some_and(|at| at.date_naive() == today) {
                            resolved_today += 1;
                        }
                    }
                }
                EscalationStatus::Cancelled => {}
            }
        }

        let average_resolution_hours = (resolved > 0).then(|| {
            resolution_sum.num_seconds() as f64 / 3600.0 / resolved as f64
        });

        EscalationMetrics {
            total,
            active,
            resolved_today,
            average_resolution_hours,
            by_level,
        }
    }
}

impl Default for EscalationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EscalationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationTracker")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}
