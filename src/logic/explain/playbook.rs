//! Triage Playbook
//!
//! Suggested analyst steps and simulated actions per hypothesis family.
//! Nothing here executes; actions are recommendations only.

use super::types::Playbook;
use crate::logic::external_intel::AttackFamily;
use crate::logic::model::Severity;

pub const ACTION_ESCALATE_INCIDENT: &str = "Simulate: Escalate to Incident";
pub const ACTION_ESCALATE_SEVERITY: &str = "Simulate: Escalate severity";
pub const ACTION_INCIDENT_REPORT: &str = "Create Incident Report (JSON)";
pub const HIGH_PREFIX: &str = "(High) ";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn playbook(label: &str, severity: Severity) -> Playbook {
    let (mut triage_steps, mut recommended_actions) = match AttackFamily::from_label(label) {
        AttackFamily::DoS => (
            strings(&[
                "Compare Packets/s and Bytes/s against the baseline.",
                "Check whether traffic concentrates on a single port or service (Destination Port).",
                "Check how often the event repeated in the last 10-30 minutes.",
            ]),
            strings(&[
                "Simulate: Rate-limit / WAF rule (recommended)",
                ACTION_ESCALATE_SEVERITY,
                ACTION_INCIDENT_REPORT,
            ]),
        ),
        AttackFamily::Scanning => (
            strings(&[
                "Check how often Destination Port changes within a short window.",
                "Check whether connections target many ports in sequence.",
                "Compare against usual BENIGN behavior if available.",
            ]),
            strings(&[
                "Simulate: Add firewall rule (preview)",
                ACTION_ESCALATE_SEVERITY,
                ACTION_INCIDENT_REPORT,
            ]),
        ),
        _ => (
            strings(&[
                "Review the evidence (top features) to understand the anomaly.",
                "Check whether the behavior repeats or ties to a specific service or port.",
                "Escalate the alert if it repeats significantly.",
            ]),
            strings(&[ACTION_ESCALATE_SEVERITY, ACTION_INCIDENT_REPORT]),
        ),
    };

    if severity == Severity::High {
        triage_steps = triage_steps
            .into_iter()
            .map(|step| format!("{}{}", HIGH_PREFIX, step))
            .collect();
        recommended_actions.insert(0, ACTION_ESCALATE_INCIDENT.to_string());
    }

    Playbook {
        triage_steps,
        recommended_actions,
    }
}
