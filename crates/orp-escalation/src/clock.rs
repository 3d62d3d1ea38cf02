//! Clock seam
//!
//! Resolution timing feeds the audit metrics, so the tracker takes its time
//! source as an injected dependency instead of calling `Utc::now` directly.

use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

/// Time source for escalation timestamps
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
