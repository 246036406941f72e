//! Case-insensitive skill overlap between a candidate and a viewer.
//!
//! A viewer interest is satisfied when any offered skill contains it, or is
//! contained by it, ignoring case and surrounding whitespace. "python"
//! therefore matches "Python", "Python 3" and "Py". Each interest counts at
//! most once, so the total reads as "how many of my interests does this
//! person cover".

/// Normalize a skill label for comparison. Returns `None` for blank labels,
/// which never match anything.
fn normalize(skill: &str) -> Option<String> {
    let trimmed = skill.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Check whether two already-normalized labels overlap.
fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Check whether a single offered skill satisfies a single interest.
pub fn skill_matches(offered: &str, interest: &str) -> bool {
    match (normalize(offered), normalize(interest)) {
        (Some(a), Some(b)) => overlaps(&a, &b),
        _ => false,
    }
}

/// Count how many of `interested_skills` are covered by `candidate_skills`.
///
/// Always within `0..=interested_skills.len()`.
pub fn count_matches<S, T>(candidate_skills: &[S], interested_skills: &[T]) -> usize
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    if candidate_skills.is_empty() || interested_skills.is_empty() {
        return 0;
    }

    let offered: Vec<String> = candidate_skills
        .iter()
        .filter_map(|s| normalize(s.as_ref()))
        .collect();

    interested_skills
        .iter()
        .filter_map(|s| normalize(s.as_ref()))
        .filter(|interest| offered.iter().any(|skill| overlaps(skill, interest)))
        .count()
}

/// Return the offered skills that satisfy at least one interest, in the
/// candidate's own order. Used to label "N matches" badges.
pub fn matching_skills<'a, T>(
    candidate_skills: &'a [String],
    interested_skills: &[T],
) -> Vec<&'a str>
where
    T: AsRef<str>,
{
    let interests: Vec<String> = interested_skills
        .iter()
        .filter_map(|s| normalize(s.as_ref()))
        .collect();
    if interests.is_empty() {
        return Vec::new();
    }

    candidate_skills
        .iter()
        .filter(|skill| {
            normalize(skill)
                .map(|s| interests.iter().any(|i| overlaps(&s, i)))
                .unwrap_or(false)
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_ignores_case() {
        assert_eq!(count_matches(&skills(&["Python"]), &skills(&["python"])), 1);
    }

    #[test]
    fn substring_matches_in_both_directions() {
        assert!(skill_matches("Python 3", "python"));
        assert!(skill_matches("Py", "python"));
        assert!(!skill_matches("Guitar", "python"));
    }

    #[test]
    fn each_interest_counts_once() {
        // Three guitar variants still satisfy a single "guitar" interest.
        let offered = skills(&["Guitar", "Electric Guitar", "Bass Guitar"]);
        assert_eq!(count_matches(&offered, &skills(&["guitar"])), 1);
    }

    #[test]
    fn counts_distinct_interests() {
        let offered = skills(&["Python", "Cooking", "Chess"]);
        let wanted = skills(&["python", "chess", "piano"]);
        assert_eq!(count_matches(&offered, &wanted), 2);
    }

    #[test]
    fn empty_inputs_yield_zero() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(count_matches(&empty, &skills(&["python"])), 0);
        assert_eq!(count_matches(&skills(&["Python"]), &empty), 0);
    }

    #[test]
    fn blank_labels_never_match() {
        assert_eq!(count_matches(&skills(&["Python"]), &skills(&["", "  "])), 0);
        assert_eq!(count_matches(&skills(&["", " "]), &skills(&["python"])), 0);
        assert!(!skill_matches("", ""));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(count_matches(&skills(&[" Rust "]), &skills(&["rust"])), 1);
    }

    #[test]
    fn matching_skills_preserves_candidate_order() {
        let offered = skills(&["Chess", "Python", "Guitar", "Python 3"]);
        let hits = matching_skills(&offered, &["python", "chess"]);
        assert_eq!(hits, vec!["Chess", "Python", "Python 3"]);
    }
}
