//! Eligibility filtering against matches, pending requests and recency.
//!
//! Request records stop excluding once older than the expiry window. The
//! filter reports those records back instead of touching storage, so the
//! caller decides how to mark them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skillswap_matching::{CandidateProfile, ProfileId};
use skillswap_state::{DiscoverySettings, DEFAULT_REQUEST_EXPIRY};
use time::{Duration, OffsetDateTime};

use crate::recency::RecencyWindow;

/// Relationship that makes a candidate ineligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionKind {
    /// A chat exists between viewer and candidate.
    Matched,
    /// The viewer sent a connection request.
    RequestSent,
    /// The candidate sent the viewer a connection request.
    RequestReceived,
}

impl ExclusionKind {
    /// Whether records of this kind lapse after the request expiry window.
    pub fn expires(self) -> bool {
        !matches!(self, ExclusionKind::Matched)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    pub kind: ExclusionKind,
    pub candidate_id: ProfileId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ExclusionRecord {
    pub fn new(
        kind: ExclusionKind,
        candidate_id: impl Into<ProfileId>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            kind,
            candidate_id: candidate_id.into(),
            created_at,
        }
    }

    pub fn matched(candidate_id: impl Into<ProfileId>, created_at: OffsetDateTime) -> Self {
        Self::new(ExclusionKind::Matched, candidate_id, created_at)
    }

    pub fn request_sent(candidate_id: impl Into<ProfileId>, created_at: OffsetDateTime) -> Self {
        Self::new(ExclusionKind::RequestSent, candidate_id, created_at)
    }

    pub fn request_received(
        candidate_id: impl Into<ProfileId>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self::new(ExclusionKind::RequestReceived, candidate_id, created_at)
    }

    /// A request record strictly older than `window` has lapsed. Matches
    /// never lapse.
    pub fn is_expired(&self, now: OffsetDateTime, window: Duration) -> bool {
        self.kind.expires() && now - self.created_at > window
    }
}

/// Result of one filter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Candidates that may be shown, in pool order.
    pub eligible: Vec<CandidateProfile>,
    /// Request records that lapsed; the caller should mark them in storage.
    pub expired: Vec<ExclusionRecord>,
    /// Candidates dropped because of a live match or request.
    pub excluded: usize,
    /// Candidates dropped only because they were shown recently.
    pub recently_shown: usize,
}

impl FilterOutcome {
    /// Candidates that pass every exclusion other than recency.
    pub fn eligible_total(&self) -> usize {
        self.eligible.len() + self.recently_shown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionFilter {
    request_expiry: Duration,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_EXPIRY)
    }
}

impl ExclusionFilter {
    pub fn new(request_expiry: std::time::Duration) -> Self {
        Self {
            request_expiry: Duration::try_from(request_expiry).unwrap_or(Duration::MAX),
        }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        Self::new(settings.request_expiry)
    }

    pub fn request_expiry(&self) -> Duration {
        self.request_expiry
    }

    /// Drop every candidate referenced by a live exclusion or present in
    /// `recency`, preserving pool order.
    pub fn apply(
        &self,
        pool: Vec<CandidateProfile>,
        exclusions: &[ExclusionRecord],
        recency: &RecencyWindow,
        now: OffsetDateTime,
    ) -> FilterOutcome {
        let mut blocked: HashSet<&ProfileId> = HashSet::new();
        let mut expired = Vec::new();
        for record in exclusions {
            if record.is_expired(now, self.request_expiry) {
                expired.push(record.clone());
            } else {
                blocked.insert(&record.candidate_id);
            }
        }

        let mut outcome = FilterOutcome {
            expired,
            ..Default::default()
        };
        for candidate in pool {
            if blocked.contains(&candidate.id) {
                outcome.excluded += 1;
            } else if recency.contains(&candidate.id) {
                outcome.recently_shown += 1;
            } else {
                outcome.eligible.push(candidate);
            }
        }

        if !outcome.expired.is_empty() {
            tracing::debug!(expired = outcome.expired.len(), "request exclusions lapsed");
        }
        outcome
    }
}

/// Filter with the default 30 minute request expiry.
pub fn filter(
    pool: Vec<CandidateProfile>,
    exclusions: &[ExclusionRecord],
    recency: &RecencyWindow,
    now: OffsetDateTime,
) -> FilterOutcome {
    ExclusionFilter::default().apply(pool, exclusions, recency, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

    fn pool(ids: &[&str]) -> Vec<CandidateProfile> {
        ids.iter()
            .map(|id| CandidateProfile::new(*id, vec!["Chess".into()]))
            .collect()
    }

    fn eligible_ids(outcome: &FilterOutcome) -> Vec<&str> {
        outcome.eligible.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn matched_candidates_are_always_excluded() {
        let ancient = NOW - Duration::days(365);
        let exclusions = [ExclusionRecord::matched("u1", ancient)];
        let outcome = filter(pool(&["u1", "u2"]), &exclusions, &RecencyWindow::new(5), NOW);
        assert_eq!(eligible_ids(&outcome), ["u2"]);
        assert_eq!(outcome.excluded, 1);
        assert!(outcome.expired.is_empty());
    }

    #[test]
    fn fresh_requests_exclude_in_both_directions() {
        let exclusions = [
            ExclusionRecord::request_sent("u1", NOW - Duration::minutes(5)),
            ExclusionRecord::request_received("u2", NOW - Duration::minutes(29)),
        ];
        let outcome = filter(pool(&["u1", "u2", "u3"]), &exclusions, &RecencyWindow::new(5), NOW);
        assert_eq!(eligible_ids(&outcome), ["u3"]);
    }

    #[test]
    fn lapsed_request_no_longer_excludes_and_is_reported() {
        let record = ExclusionRecord::request_sent("u3", NOW - Duration::minutes(31));
        let outcome = filter(
            pool(&["u3"]),
            std::slice::from_ref(&record),
            &RecencyWindow::new(5),
            NOW,
        );
        assert_eq!(eligible_ids(&outcome), ["u3"]);
        assert_eq!(outcome.expired, vec![record]);
    }

    #[test]
    fn request_exactly_at_window_still_excludes() {
        let exclusions = [ExclusionRecord::request_received("u1", NOW - Duration::minutes(30))];
        let outcome = filter(pool(&["u1"]), &exclusions, &RecencyWindow::new(5), NOW);
        assert!(outcome.eligible.is_empty());
        assert!(outcome.expired.is_empty());
    }

    #[test]
    fn recently_shown_candidates_are_skipped() {
        let mut recency = RecencyWindow::new(5);
        recency.record("u2".into());
        let outcome = filter(pool(&["u1", "u2", "u3"]), &[], &recency, NOW);
        assert_eq!(eligible_ids(&outcome), ["u1", "u3"]);
        assert_eq!(outcome.recently_shown, 1);
        assert_eq!(outcome.eligible_total(), 3);
    }

    #[test]
    fn custom_expiry_window() {
        let filter = ExclusionFilter::new(std::time::Duration::from_secs(60));
        let exclusions = [ExclusionRecord::request_sent("u1", NOW - Duration::minutes(2))];
        let outcome = filter.apply(pool(&["u1"]), &exclusions, &RecencyWindow::new(5), NOW);
        assert_eq!(eligible_ids(&outcome), ["u1"]);
        assert_eq!(outcome.expired.len(), 1);
    }

    #[test]
    fn empty_pool_yields_empty_result() {
        let outcome = filter(Vec::new(), &[], &RecencyWindow::new(5), NOW);
        assert!(outcome.eligible.is_empty());
    }

    #[test]
    fn record_serializes_with_backend_field_names() {
        let record = ExclusionRecord::request_sent("u9", NOW);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"REQUEST_SENT\""));
        assert!(json.contains("\"candidateId\":\"u9\""));
        assert!(json.contains("\"createdAt\":\"2026-03-01T12:00:00Z\""));
    }
}
