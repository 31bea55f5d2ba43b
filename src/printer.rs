//! Plain-text rendering of a WIP report, for ad-hoc inspection.

use crate::classifier::WipReport;
use std::fmt::Write as _;
use std::io;

/// Renders the bucket sizes as aligned label/count lines.
pub fn render_report(report: &WipReport<'_>) -> String {
    let rows = [
        ("Open:", report.open.len()),
        ("Draft:", report.draft.len()),
        ("Approved:", report.approved.len()),
        ("Commented:", report.commented.len()),
        ("Overdue:", report.overdue_review.len()),
    ];

    let mut out = String::new();
    for (label, count) in rows {
        let _ = writeln!(out, "{label:<11}{count}");
    }
    out
}

/// Writes the report to a caller-supplied sink.
pub fn write_report<W: io::Write>(out: &mut W, report: &WipReport<'_>) -> io::Result<()> {
    out.write_all(render_report(report).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::PullRequest;
    use chrono::{TimeZone, Utc};

    fn sample_pr() -> PullRequest {
        PullRequest {
            title: "test".to_string(),
            author: "octocat".to_string(),
            is_draft: false,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            reviews: vec![],
        }
    }

    #[test]
    fn test_render_report_aligns_counts() {
        let prs = [sample_pr(), sample_pr()];
        let report = WipReport {
            open: prs.iter().collect(),
            draft: vec![&prs[0]],
            approved: vec![],
            commented: vec![&prs[1], &prs[1]],
            overdue_review: vec![&prs[1]],
        };

        let rendered = render_report(&report);
        let expected = "\
Open:      2
Draft:     1
Approved:  0
Commented: 2
Overdue:   1
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_write_report_uses_the_given_sink() {
        let report = WipReport::default();

        let mut buf = Vec::new();
        write_report(&mut buf, &report).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("Open:      0\n"));
    }
}
