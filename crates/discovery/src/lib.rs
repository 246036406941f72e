//! Candidate discovery for SkillSwap.
//!
//! This crate turns a raw candidate pool into a per-viewer queue:
//! - Filtering out matched candidates and live connection requests.
//! - Tracking recently shown candidates so they are not served again soon.
//! - Replenishing the queue from injected async data sources.
//!
//! `DiscoveryQueue` is the synchronous state machine and can be driven by
//! hand. `DiscoverySession` drives it against `DiscoverySources`.
//!
//! # Examples
//!
//! ```
//! use skillswap_discovery::{DiscoveryQueue, QueueState, SourceBatch};
//! use skillswap_matching::{RawCandidate, Viewer};
//! use skillswap_state::DiscoverySettings;
//! use time::OffsetDateTime;
//!
//! let viewer = Viewer::new("me", vec!["python".into()]);
//! let mut queue = DiscoveryQueue::new(viewer, DiscoverySettings::default());
//!
//! let pool = vec![RawCandidate {
//!     id: Some("u1".into()),
//!     skills: Some(vec!["Python".into()]),
//!     ..Default::default()
//! }];
//! queue
//!     .load(SourceBatch::new(pool, Vec::new()), OffsetDateTime::now_utc())
//!     .unwrap();
//!
//! assert_eq!(queue.state(), QueueState::Ready);
//! assert_eq!(queue.current().unwrap().profile.id.as_str(), "u1");
//! ```

#![deny(unsafe_code)]

mod clock;
mod error;
mod exclusion;
mod queue;
mod recency;
mod session;
mod source;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DiscoveryError, SourceKind};
pub use exclusion::{filter, ExclusionFilter, ExclusionKind, ExclusionRecord, FilterOutcome};
pub use queue::{
    AdvanceOutcome, DiscoveryQueue, QueueState, ReplenishOutcome, ReplenishReport,
    ReplenishTicket, SourceBatch, Suggestions,
};
pub use recency::RecencyWindow;
pub use session::DiscoverySession;
pub use source::{DiscoverySources, ExclusionSource, ExpiryReporter, InMemorySource, PoolFetcher};
