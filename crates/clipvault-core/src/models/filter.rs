use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::submission::{SubmissionRecord, SubmissionStatus};

/// Read-side filter over the submission set. All populated criteria must hold
/// (logical AND), so applying two filters in sequence equals applying their
/// conjunction in one pass.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmissionFilter {
    /// Case-insensitive substring match over name, email, location, description.
    pub search: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub own_recording: Option<bool>,
    pub want_credit: Option<bool>,
    /// Only records that want credit but carry no payout email.
    #[serde(default)]
    pub missing_payout_email: bool,
    pub statuses: Option<Vec<SubmissionStatus>>,
}

impl SubmissionFilter {
    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        if let Some(ref needle) = self.search {
            let needle = needle.trim().to_lowercase();
            if !needle.is_empty() {
                let haystacks = [
                    Some(record.submitter_name()),
                    Some(record.email.clone()),
                    record.location.clone(),
                    record.description.clone(),
                ];
                let hit = haystacks
                    .iter()
                    .flatten()
                    .any(|h| h.to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
        }
        if let Some(from) = self.date_from {
            if record.submitted_at < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.submitted_at > to {
                return false;
            }
        }
        if let Some(own) = self.own_recording {
            if record.own_recording != own {
                return false;
            }
        }
        if let Some(credit) = self.want_credit {
            if record.want_credit != credit {
                return false;
            }
        }
        if self.missing_payout_email
            && !(record.want_credit
                && record
                    .payout_email
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .is_empty())
        {
            return false;
        }
        if let Some(ref statuses) = self.statuses {
            if !statuses.contains(&record.status) {
                return false;
            }
        }
        true
    }

    /// Filter a snapshot of the submission set, preserving order.
    pub fn apply<'a>(&self, records: &'a [SubmissionRecord]) -> Vec<&'a SubmissionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Counters for the admin dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub want_credit: usize,
    pub missing_payout_email: usize,
}

impl SubmissionStats {
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a SubmissionRecord>) -> Self {
        let mut stats = SubmissionStats::default();
        for record in records {
            stats.total += 1;
            match record.status {
                SubmissionStatus::Pending => stats.pending += 1,
                SubmissionStatus::Approved => stats.approved += 1,
                SubmissionStatus::Rejected => stats.rejected += 1,
            }
            if record.want_credit {
                stats.want_credit += 1;
                if record
                    .payout_email
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .is_empty()
                {
                    stats.missing_payout_email += 1;
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSubmission;
    use chrono::Duration;
    use uuid::Uuid;

    fn record(first: &str, email: &str, days_ago: i64) -> SubmissionRecord {
        let form = NewSubmission {
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            location: Some("Porto".to_string()),
            description: Some("sunset clip".to_string()),
            own_recording: true,
            recorder_name: None,
            want_credit: false,
            credit_platform: None,
            credit_username: None,
            payout_email: None,
            agreed_terms: true,
            agreed_distribution: true,
        };
        form.into_record(Uuid::new_v4(), Utc::now() - Duration::days(days_ago))
    }

    #[test]
    fn test_search_matches_across_fields() {
        let records = vec![record("Jane", "j@x.com", 0), record("Ana", "a@y.com", 0)];
        let filter = SubmissionFilter {
            search: Some("JANE".to_string()),
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Jane");

        let by_location = SubmissionFilter {
            search: Some("porto".to_string()),
            ..Default::default()
        };
        assert_eq!(by_location.apply(&records).len(), 2);
    }

    #[test]
    fn test_date_range_is_inclusive_bounds() {
        let records = vec![record("Old", "o@x.com", 10), record("New", "n@x.com", 1)];
        let filter = SubmissionFilter {
            date_from: Some(Utc::now() - Duration::days(5)),
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "New");
    }

    #[test]
    fn test_status_set_filter() {
        let mut records = vec![record("A", "a@x.com", 0), record("B", "b@x.com", 0)];
        records[1].status = SubmissionStatus::Approved;
        let filter = SubmissionFilter {
            statuses: Some(vec![SubmissionStatus::Approved]),
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "B");
    }

    #[test]
    fn test_missing_payout_email_flag() {
        let mut wants_no_payout = record("C", "c@x.com", 0);
        wants_no_payout.want_credit = true;
        let mut wants_with_payout = record("D", "d@x.com", 0);
        wants_with_payout.want_credit = true;
        wants_with_payout.payout_email = Some("pay@x.com".to_string());
        let records = vec![wants_no_payout, wants_with_payout, record("E", "e@x.com", 0)];

        let filter = SubmissionFilter {
            missing_payout_email: true,
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "C");
    }

    #[test]
    fn test_filters_compose_as_conjunction() {
        let mut records: Vec<SubmissionRecord> = (0..6)
            .map(|i| record(&format!("P{}", i), &format!("p{}@x.com", i), i))
            .collect();
        records[0].want_credit = true;
        records[2].want_credit = true;

        let a = SubmissionFilter {
            want_credit: Some(true),
            ..Default::default()
        };
        let b = SubmissionFilter {
            date_from: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        };

        // filter(filter(S, A), B) == { r in S : A(r) && B(r) }
        let sequential: Vec<Uuid> = b
            .apply(&a.apply(&records).into_iter().cloned().collect::<Vec<_>>())
            .into_iter()
            .map(|r| r.id)
            .collect();
        let conjunction: Vec<Uuid> = records
            .iter()
            .filter(|r| a.matches(r) && b.matches(r))
            .map(|r| r.id)
            .collect();
        assert_eq!(sequential, conjunction);
    }

    #[test]
    fn test_stats_collect() {
        let mut records = vec![
            record("A", "a@x.com", 0),
            record("B", "b@x.com", 0),
            record("C", "c@x.com", 0),
        ];
        records[1].status = SubmissionStatus::Approved;
        records[2].status = SubmissionStatus::Rejected;
        records[2].want_credit = true;

        let stats = SubmissionStats::collect(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.want_credit, 1);
        assert_eq!(stats.missing_payout_email, 1);
    }
}
