//! Bounded in-memory alert feed
//!
//! Holds the most recent N alerts for an organization. Alerts are never
//! deleted individually; the window evicts the oldest entry when full.
//! Mutation happens on the single event-dispatch task, so a plain mutex is
//! all the discipline required.

use crate::alert::{Alert, AlertError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use uuid::Uuid;

/// Default rolling-window capacity
pub const DEFAULT_WINDOW: usize = 10;

/// Rolling window of the most recent alerts
#[derive(Debug)]
pub struct AlertFeed {
    inner: Mutex<VecDeque<Alert>>,
    cap: usize,
}

impl AlertFeed {
    /// Create a feed with the default window
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }

    /// Create a feed holding at most `cap` alerts (minimum 1)
    #[inline]
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            cap: cap.max(1),
        }
    }

    /// Window capacity
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Number of alerts currently in the window
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the window is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Append an alert, evicting the oldest entry when the window is full
    pub fn push(&self, alert: Alert) {
        let mut guard = self.inner.lock();
        if guard.len() == self.cap {
            if let Some(evicted) = guard.pop_front() {
                tracing::debug!(alert = %evicted.id, "alert evicted from rolling window");
            }
        }
        guard.push_back(alert);
    }

    /// Mark an alert acknowledged
    ///
    /// # Errors
    /// `AlertError::NotFound` if the id is not in the current window.
    pub fn acknowledge(&self, id: Uuid) -> Result<(), AlertError> {
        let mut guard = self.inner.lock();
        match guard.iter_mut().find(|alert| alert.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                Ok(())
            }
            None => Err(AlertError::NotFound(id)),
        }
    }

    /// Snapshot of the window, most recent first
    #[must_use]
    pub fn recent(&self) -> Vec<Alert> {
        self.inner.lock().iter().rev().cloned().collect()
    }

    /// Snapshot of unacknowledged alerts, most recent first
    #[must_use]
    pub fn unacknowledged(&self) -> Vec<Alert> {
        self.inner
            .lock()
            .iter()
            .rev()
            .filter(|alert| !alert.acknowledged)
            .cloned()
            .collect()
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new()
    }
}
