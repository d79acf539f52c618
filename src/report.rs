use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{ContactRecord, EscalationRecord, StatusSummary};

pub fn summarize_by_status(escalations: &[EscalationRecord]) -> Vec<StatusSummary> {
    let mut map: HashMap<&str, usize> = HashMap::new();
    for escalation in escalations {
        *map.entry(escalation.status.as_str()).or_insert(0) += 1;
    }

    let mut summaries: Vec<StatusSummary> = map
        .into_iter()
        .map(|(status, count)| StatusSummary {
            status: status.to_string(),
            count,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    summaries
}

/// Per caregiver: (name, email, alerts delivered, calls placed).
pub fn contacts_by_caregiver(contacts: &[ContactRecord]) -> Vec<(String, String, usize, usize)> {
    let mut map: HashMap<&str, (String, usize, usize)> = HashMap::new();
    for contact in contacts {
        let entry = map
            .entry(contact.caregiver_email.as_str())
            .or_insert_with(|| (contact.caregiver_name.clone(), 0, 0));
        if contact.notified {
            entry.1 += 1;
        }
        if contact.dial == "dialed" {
            entry.2 += 1;
        }
    }

    let mut rows: Vec<(String, String, usize, usize)> = map
        .into_iter()
        .map(|(email, (name, notified, dialed))| (name, email.to_string(), notified, dialed))
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));
    rows
}

pub fn build_report(
    user: Option<&str>,
    since: DateTime<Utc>,
    escalations: &[EscalationRecord],
    contacts: &[ContactRecord],
) -> String {
    let summaries = summarize_by_status(escalations);
    let caregivers = contacts_by_caregiver(contacts);

    let mut output = String::new();
    let user_label = user.unwrap_or("all users");

    let _ = writeln!(output, "# Breakdown Escalation Report");
    let _ = writeln!(
        output,
        "Generated for {} (escalations since {})",
        user_label,
        since.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Outcomes");

    if summaries.is_empty() {
        let _ = writeln!(output, "No escalations recorded for this window.");
    } else {
        let _ = writeln!(output, "{} escalations in total.", escalations.len());
        for summary in summaries.iter() {
            let _ = writeln!(output, "- {}: {}", summary.status, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Caregivers Contacted");

    if caregivers.is_empty() {
        let _ = writeln!(output, "No caregivers were contacted in this window.");
    } else {
        for (name, email, notified, dialed) in caregivers.iter() {
            let _ = writeln!(
                output,
                "- {} ({}): {} alerts, {} calls",
                name, email, notified, dialed
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Escalations");

    if escalations.is_empty() {
        let _ = writeln!(output, "No escalations recorded for this window.");
    } else {
        let mut recent = escalations.to_vec();
        recent.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        for escalation in recent.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} at {}: intensity {}, stress {}, {} triggers ({})",
                escalation.user_name,
                escalation.triggered_at.format("%Y-%m-%d %H:%M"),
                escalation.emotion_intensity,
                escalation.stress_level,
                escalation.trigger_count,
                escalation.status
            );
        }
    }

    output
}
