//! Multi-key candidate ranking.
//!
//! Candidates that cover at least one viewer interest come first, ordered by
//! match count, then rating, then rating count (all descending). Candidates
//! with no match follow, ordered by rating and rating count. The sort is
//! stable, so fetch order decides full ties.

use crate::profile::CandidateProfile;
use crate::skills::count_matches;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A profile together with its per-viewer match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub profile: CandidateProfile,
    /// How many of the viewer's interests this profile covers.
    pub matching_skills: usize,
}

impl RankedCandidate {
    /// Score a profile against the viewer's interests.
    pub fn score<T: AsRef<str>>(profile: CandidateProfile, interested_skills: &[T]) -> Self {
        let matching_skills = count_matches(&profile.skills, interested_skills);
        Self {
            profile,
            matching_skills,
        }
    }

    /// True when at least one interest is covered.
    pub fn has_matches(&self) -> bool {
        self.matching_skills > 0
    }
}

/// Compare two profiles by rating, then rating count, both descending.
fn by_reputation(a: &CandidateProfile, b: &CandidateProfile) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.rating_count.cmp(&a.rating_count))
}

/// Full ranking order for already-scored candidates.
fn by_rank(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.matching_skills
        .cmp(&a.matching_skills)
        .then_with(|| by_reputation(&a.profile, &b.profile))
}

/// Rank candidates for a viewer.
///
/// Does not mutate the input; returns scored copies in rank order.
pub fn rank<T: AsRef<str>>(
    candidates: &[CandidateProfile],
    interested_skills: &[T],
) -> Vec<RankedCandidate> {
    let (mut with_matches, mut without_matches): (Vec<_>, Vec<_>) = candidates
        .iter()
        .cloned()
        .map(|profile| RankedCandidate::score(profile, interested_skills))
        .partition(RankedCandidate::has_matches);

    // `sort_by` is stable; fetch order breaks remaining ties.
    with_matches.sort_by(by_rank);
    without_matches.sort_by(|a, b| by_reputation(&a.profile, &b.profile));

    with_matches.extend(without_matches);
    with_matches
}

/// The `limit` best-ranked candidates.
pub fn suggestions<T: AsRef<str>>(
    candidates: &[CandidateProfile],
    interested_skills: &[T],
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked = rank(candidates, interested_skills);
    ranked.truncate(limit);
    ranked
}

/// Find candidates whose display name contains `query`, case-insensitively,
/// in rank order. A blank query finds nothing.
pub fn search_by_name<T: AsRef<str>>(
    candidates: &[CandidateProfile],
    query: &str,
    interested_skills: &[T],
    limit: usize,
) -> Vec<RankedCandidate> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let hits: Vec<CandidateProfile> = candidates
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    let mut ranked = rank(&hits, interested_skills);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, skills: &[&str], rating: f64, count: u32) -> CandidateProfile {
        CandidateProfile::new(id, skills.iter().map(|s| s.to_string()).collect())
            .with_rating(rating, count)
    }

    fn ids(ranked: &[RankedCandidate]) -> Vec<&str> {
        ranked.iter().map(|r| r.profile.id.as_str()).collect()
    }

    #[test]
    fn match_beats_higher_rating() {
        let pool = vec![
            profile("u1", &["Guitar"], 4.0, 10),
            profile("u2", &["Python"], 5.0, 2),
        ];
        let ranked = rank(&pool, &["python"]);
        assert_eq!(ids(&ranked), ["u2", "u1"]);
        assert_eq!(ranked[0].matching_skills, 1);
        assert_eq!(ranked[1].matching_skills, 0);
    }

    #[test]
    fn more_matches_rank_higher() {
        let pool = vec![
            profile("one", &["Python"], 5.0, 50),
            profile("two", &["Python", "Chess"], 3.0, 1),
        ];
        let ranked = rank(&pool, &["python", "chess"]);
        assert_eq!(ids(&ranked), ["two", "one"]);
    }

    #[test]
    fn rating_then_count_break_match_ties() {
        let pool = vec![
            profile("low", &["Python"], 3.0, 9),
            profile("few", &["Python"], 4.5, 2),
            profile("many", &["Python"], 4.5, 8),
        ];
        let ranked = rank(&pool, &["python"]);
        assert_eq!(ids(&ranked), ["many", "few", "low"]);
    }

    #[test]
    fn unmatched_candidates_fall_back_to_reputation() {
        let pool = vec![
            profile("unrated", &["Knitting"], 0.0, 0),
            profile("good", &["Surfing"], 4.0, 3),
            profile("great", &["Opera"], 4.8, 12),
        ];
        let ranked = rank(&pool, &["python"]);
        assert_eq!(ids(&ranked), ["great", "good", "unrated"]);
    }

    #[test]
    fn identical_keys_keep_input_order() {
        let pool = vec![
            profile("x", &["Python"], 4.0, 3),
            profile("y", &["Python"], 4.0, 3),
        ];
        assert_eq!(ids(&rank(&pool, &["python"])), ["x", "y"]);
    }

    #[test]
    fn rank_does_not_mutate_input() {
        let pool = vec![
            profile("a", &[], 1.0, 1),
            profile("b", &["Python"], 2.0, 1),
        ];
        let before = pool.clone();
        let _ = rank(&pool, &["python"]);
        assert_eq!(pool, before);
    }

    #[test]
    fn no_interests_ranks_by_reputation() {
        let pool = vec![profile("a", &["Python"], 2.0, 1), profile("b", &[], 5.0, 1)];
        let empty: [&str; 0] = [];
        assert_eq!(ids(&rank(&pool, &empty)), ["b", "a"]);
    }

    #[test]
    fn suggestions_truncate_to_limit() {
        let pool: Vec<_> = (0..15)
            .map(|i| profile(&format!("p{i}"), &[], 1.0 + (i as f64) / 5.0, 1))
            .collect();
        let top = suggestions(&pool, &["python"], 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].profile.id.as_str(), "p14");
    }

    #[test]
    fn search_matches_partial_names_case_insensitively() {
        let pool = vec![
            profile("a", &[], 3.0, 1).with_name("Ada Lovelace"),
            profile("b", &["Python"], 2.0, 1).with_name("Adam Smith"),
            profile("c", &[], 5.0, 1).with_name("Grace Hopper"),
        ];
        let hits = search_by_name(&pool, "  ADA ", &["python"], 10);
        assert_eq!(ids(&hits), ["b", "a"]);
    }

    #[test]
    fn blank_search_finds_nothing() {
        let pool = vec![profile("a", &[], 3.0, 1).with_name("Ada")];
        assert!(search_by_name(&pool, "   ", &["python"], 10).is_empty());
    }
}
