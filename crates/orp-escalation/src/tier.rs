//! Escalation level to assignment tier
//!
//! Presentation metadata only: the mapping names who a level is assigned
//! to, it does not page or route anyone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignment tier for an escalation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTier {
    /// Level 1: business-unit manager
    Operational,
    /// Level 2: senior management / CRO
    SeniorManagement,
    /// Level 3: board / regulator
    Board,
    /// Any level outside the defined range
    Unassigned,
}

impl EscalationTier {
    /// Resolve a tier from a 1-indexed escalation level
    ///
    /// Levels outside 1..=3 map to `Unassigned` rather than reusing the
    /// top tier.
    #[inline]
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => EscalationTier::Operational,
            2 => EscalationTier::SeniorManagement,
            3 => EscalationTier::Board,
            _ => EscalationTier::Unassigned,
        }
    }

    /// Tier name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationTier::Operational => "operational",
            EscalationTier::SeniorManagement => "senior_management",
            EscalationTier::Board => "board",
            EscalationTier::Unassigned => "unassigned",
        }
    }

    /// Human-readable assignee description
    #[inline]
    #[must_use]
    pub fn assignee_label(&self) -> &'static str {
        match self {
            EscalationTier::Operational => "Business Unit Manager",
            EscalationTier::SeniorManagement => "Senior Management / CRO",
            EscalationTier::Board => "Board / Regulator",
            EscalationTier::Unassigned => "Unassigned",
        }
    }
}

impl fmt::Display for EscalationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
