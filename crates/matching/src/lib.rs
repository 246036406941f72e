//! Skill matching and candidate ranking for SkillSwap discovery.
//!
//! This crate provides:
//! - The candidate profile model and validation of raw backend entries
//! - Case-insensitive skill overlap counting
//! - Multi-key ranking, top-N suggestions and name search
//! - Running star-rating averages
//!
//! Everything here is pure and synchronous.
//!
//! # Examples
//!
//! ```
//! use skillswap_matching::{rank, CandidateProfile};
//!
//! let pool = vec![
//!     CandidateProfile::new("u1", vec!["Guitar".into()]).with_rating(4.0, 10),
//!     CandidateProfile::new("u2", vec!["Python".into()]).with_rating(5.0, 2),
//! ];
//! let ranked = rank(&pool, &["python"]);
//! assert_eq!(ranked[0].profile.id.as_str(), "u2");
//! ```

#![deny(unsafe_code)]

pub mod profile;
pub mod rank;
pub mod rating;
pub mod skills;

pub use profile::{
    sanitize_pool, CandidateProfile, ProfileError, ProfileId, RawCandidate, Viewer, MAX_RATING,
};
pub use rank::{rank, search_by_name, suggestions, RankedCandidate};
pub use rating::{RatingError, RatingSummary};
pub use skills::{count_matches, matching_skills, skill_matches};
