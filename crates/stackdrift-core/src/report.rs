//! Drift report rendering
//!
//! Builds the single notification sent for a run with diffs or errors.

use crate::model::RunSummary;

/// Printed when a run finds nothing to report
pub const CLEAN_RUN_MARKER: &str = "✔ No diffs/errors. (No notification)";
/// Printed after the notification went out
pub const NOTIFIED_MARKER: &str = "✔ Notification published";
/// Printed as the last line of every successful run
pub const COMPLETED_MARKER: &str = "✔ Drift check completed";

const SUBJECT_PREFIX: &str = "[CFN Template Diff]";
const BODY_TITLE: &str = "CloudFormation template drift detected (canonical JSON comparison)";

/// Subject and body of a drift notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

/// Build the notification for a run, or `None` when the run is clean
pub fn build_notification(summary: &RunSummary) -> Option<NotificationMessage> {
    if summary.is_clean() {
        return None;
    }

    let branch = if summary.branch.is_empty() {
        "branch"
    } else {
        summary.branch.as_str()
    };
    let subject = format!(
        "{} {} diffs={} errors={}",
        SUBJECT_PREFIX, branch, summary.diff_count, summary.error_count
    );

    Some(NotificationMessage {
        subject,
        body: render_body(summary),
    })
}

fn render_body(summary: &RunSummary) -> String {
    let mut lines = vec![
        BODY_TITLE.to_string(),
        format!("CheckedAt(UTC): {}", summary.checked_at_utc),
    ];
    if !summary.stack_name_label.is_empty() {
        lines.push(format!("SystemStack: {}", summary.stack_name_label));
    }
    if !summary.branch.is_empty() {
        lines.push(format!("Branch: {}", summary.branch));
    }
    lines.push(String::new());

    if summary.diff_count > 0 {
        lines.push(format!("DIFF: {}", summary.diff_count));
        for (i, d) in summary.diffs().enumerate() {
            lines.push(format!(
                "{}. github={}  stack={}",
                i + 1,
                d.pair.local_path,
                d.pair.remote_identifier
            ));
        }
        lines.push(String::new());
    }

    if summary.error_count > 0 {
        lines.push(format!("ERROR: {}", summary.error_count));
        for (i, e) in summary.errors().enumerate() {
            lines.push(format!(
                "{}. github={}  stack={}  err={}",
                i + 1,
                e.pair.local_path,
                e.pair.remote_identifier,
                e.error.as_deref().unwrap_or_default()
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonResult, TemplatePair};

    fn summary(items: Vec<ComparisonResult>, branch: &str) -> RunSummary {
        RunSummary::from_results("2026-01-01T00:00:00+00:00", branch, None, items)
    }

    #[test]
    fn test_clean_run_has_no_notification() {
        let items = vec![ComparisonResult::compared(
            TemplatePair::new("t/a.yaml", "s-a"),
            true,
            "d".into(),
            "d".into(),
        )];
        assert!(build_notification(&summary(items, "main")).is_none());
    }

    #[test]
    fn test_diff_listed_in_body() {
        let items = vec![ComparisonResult::compared(
            TemplatePair::new("t/a.yaml", "s-a"),
            false,
            "d1".into(),
            "d2".into(),
        )];
        let msg = build_notification(&summary(items, "main")).unwrap();
        assert_eq!(msg.subject, "[CFN Template Diff] main diffs=1 errors=0");
        assert!(msg.body.contains("DIFF: 1"));
        assert!(msg.body.contains("1. github=t/a.yaml  stack=s-a"));
        assert!(msg.body.contains("Branch: main"));
        assert!(!msg.body.contains("ERROR:"));
    }

    #[test]
    fn test_error_listed_with_text_and_default_branch() {
        let items = vec![ComparisonResult::failed(
            TemplatePair::new("t/b.yaml", "s-b"),
            "Stack with id s-b does not exist",
        )];
        let msg = build_notification(&summary(items, "")).unwrap();
        assert_eq!(msg.subject, "[CFN Template Diff] branch diffs=0 errors=1");
        assert!(msg
            .body
            .contains("1. github=t/b.yaml  stack=s-b  err=Stack with id s-b does not exist"));
        assert!(!msg.body.contains("Branch:"));
    }

    #[test]
    fn test_label_line() {
        let items = vec![ComparisonResult::failed(TemplatePair::new("a", "b"), "x")];
        let s = RunSummary::from_results("now", "dev", Some("core-system".into()), items);
        let msg = build_notification(&s).unwrap();
        assert!(msg.body.contains("SystemStack: core-system"));
    }
}
