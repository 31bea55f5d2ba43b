use crate::github::{PullRequest, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Hours a pull request may wait for attention before it counts as overdue.
const REVIEW_SLA_HOURS: i64 = 24;

/// One snapshot of work-in-progress, bucketed by review status.
///
/// Every bucket holds references into the input slice. A pull request lands
/// in exactly one of draft / approved / overdue (or none of them, when it
/// is fresh), may additionally land in `commented`, and is always in
/// `open`. Reports are built fresh per pass and never mutated afterwards.
#[derive(Debug, Default)]
pub struct WipReport<'a> {
    pub open: Vec<&'a PullRequest>,
    pub draft: Vec<&'a PullRequest>,
    pub approved: Vec<&'a PullRequest>,
    pub commented: Vec<&'a PullRequest>,
    pub overdue_review: Vec<&'a PullRequest>,
}

/// Buckets a list of open pull requests by their review status.
///
/// Pure and deterministic for a given `prs` and `now`; `now` is injected so
/// the SLA arithmetic is testable.
pub fn classify<'a>(prs: &'a [PullRequest], now: DateTime<Utc>) -> WipReport<'a> {
    let sla = Duration::hours(REVIEW_SLA_HOURS);
    let mut report = WipReport::default();

    for pr in prs {
        report.open.push(pr);

        // Drafts are not awaiting review; nothing further applies to them.
        if pr.is_draft {
            report.draft.push(pr);
            continue;
        }

        let mut approved = false;
        let mut last_comment: Option<DateTime<Utc>> = None;
        for review in &pr.reviews {
            match review.state {
                ReviewState::Approved => approved = true,
                ReviewState::Commented => {
                    // One entry per comment review, on purpose: the bucket
                    // counts review activity, not distinct pull requests.
                    report.commented.push(pr);
                    if let Some(at) = review.submitted_at {
                        if last_comment.is_none_or(|prev| prev < at) {
                            last_comment = Some(at);
                        }
                    }
                }
                ReviewState::Other => {}
            }
        }

        if approved {
            report.approved.push(pr);
        } else {
            let overdue = match last_comment {
                // Never commented on: overdue once the PR itself ages out.
                None => now - pr.created_at > sla,
                // Commented on but unresolved: overdue once the latest
                // comment ages out.
                Some(at) => now - at > sla,
            };
            if overdue {
                report.overdue_review.push(pr);
            }
        }
    }

    report
}
