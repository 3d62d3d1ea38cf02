//! Regulatory message content
//!
//! The heading, citation and disclaimer below are fixed compliance content
//! and must appear verbatim in every breach notification.

use crate::channel::{EmailMessage, SmsMessage};
use crate::config::NotifyPriority;
use crate::dispatcher::BreachNotice;

/// Regulatory heading required on every breach email
pub const REGULATORY_HEADING: &str = "OSFI E-21 Tolerance Breach Alert";

/// Regulatory citation required in every breach email body
pub const PRINCIPLE_CITATION: &str = "OSFI E-21 Principle 7 requires institutions to establish \
and test tolerances for disruption for critical operations, and to escalate breaches of those \
tolerances to senior management without delay.";

/// Non-advice disclaimer required in every breach email body
pub const DISCLAIMER: &str = "This does not constitute regulatory advice. Consult your \
compliance function for the interpretation of regulatory requirements.";

/// Build the breach notification email
#[must_use]
pub fn breach_email(notice: &BreachNotice) -> EmailMessage {
    let severity = notice.severity.as_str().to_uppercase();
    let actual = notice
        .actual
        .map_or_else(|| "n/a".to_string(), |v| v.to_string());
    let threshold = notice
        .threshold
        .map_or_else(|| "n/a".to_string(), |v| v.to_string());

    let subject = format!("{REGULATORY_HEADING}: {} [{severity}]", notice.title);
    let html = format!(
        "<h1>{REGULATORY_HEADING}</h1>\
         <p><strong>{}</strong></p>\
         <p>Severity: {severity}</p>\
         <p>Measure: {} &mdash; actual {actual} vs threshold {threshold}</p>\
         <p>{}</p>\
         <p>{PRINCIPLE_CITATION}</p>\
         <p><em>{DISCLAIMER}</em></p>",
        notice.title, notice.metric, notice.summary,
    );

    EmailMessage { subject, html }
}

/// Build the breach notification SMS
#[must_use]
pub fn breach_sms(notice: &BreachNotice, priority: NotifyPriority) -> SmsMessage {
    let severity = notice.severity.as_str().to_uppercase();
    SmsMessage {
        priority: priority.as_str().to_string(),
        message: format!("{REGULATORY_HEADING} [{severity}]: {}", notice.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orp_alert::AlertSeverity;

    fn notice() -> BreachNotice {
        BreachNotice {
            title: "Settlement lag".to_string(),
            severity: AlertSeverity::Critical,
            metric: "settlement-lag".to_string(),
            actual: Some(12.5),
            threshold: Some(10.0),
            summary: "Threshold breached: 12.5 vs 10".to_string(),
        }
    }

    #[test]
    fn email_carries_required_regulatory_content() {
        let message = breach_email(&notice());
        assert!(message.subject.contains(REGULATORY_HEADING));
        assert!(message.html.contains("OSFI E-21 Principle 7"));
        assert!(message.html.contains("This does not constitute regulatory advice"));
        assert!(message.html.contains("CRITICAL"));
        assert!(message.html.contains("actual 12.5 vs threshold 10"));
    }

    #[test]
    fn email_without_measurements_prints_placeholders() {
        let mut n = notice();
        n.actual = None;
        n.threshold = None;
        let message = breach_email(&n);
        assert!(message.html.contains("actual n/a vs threshold n/a"));
    }

    #[test]
    fn sms_forwards_priority() {
        let message = breach_sms(&notice(), NotifyPriority::Urgent);
        assert_eq!(message.priority, "urgent");
        assert!(message.message.contains("Settlement lag"));
        assert!(message.message.contains(REGULATORY_HEADING));
    }
}
