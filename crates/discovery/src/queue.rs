//! The discovery queue state machine.
//!
//! `DiscoveryQueue` never performs I/O. Fetching is split into
//! `begin_replenish` (hands out a ticket) and `complete_replenish` /
//! `fail_replenish` (consume it), so a driver can run the fetch however it
//! likes. Tickets carry the generation they were issued in; `reset` bumps the
//! generation and any older ticket is discarded on completion.
//!
//! ```text
//! Empty --begin_replenish--> Loading --complete(>=1)--> Ready
//!   ^                           |  \--complete(0)/fail--> Empty
//!   |                           |
//!   +------ advance (last) -----+---- Ready --advance--> Ready
//! ```

use std::collections::{HashSet, VecDeque};

use skillswap_matching::{
    rank, sanitize_pool, suggestions, CandidateProfile, ProfileError, ProfileId, RankedCandidate,
    RawCandidate, Viewer,
};
use skillswap_state::DiscoverySettings;
use time::OffsetDateTime;

use crate::error::DiscoveryError;
use crate::exclusion::{ExclusionFilter, ExclusionRecord};
use crate::recency::RecencyWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing to show and nothing in flight.
    Empty,
    /// A current candidate is available.
    Ready,
    /// Nothing to show yet; a replenish is in flight.
    Loading,
}

/// One fetch worth of external data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    pub pool: Vec<RawCandidate>,
    pub exclusions: Vec<ExclusionRecord>,
}

impl SourceBatch {
    pub fn new(pool: Vec<RawCandidate>, exclusions: Vec<ExclusionRecord>) -> Self {
        Self { pool, exclusions }
    }
}

/// Proof that a replenish was started in a given generation.
///
/// Completing or failing the replenish consumes the ticket:
///
/// ```compile_fail
/// # use skillswap_discovery::{DiscoveryQueue, SourceBatch};
/// # use skillswap_matching::Viewer;
/// # use skillswap_state::DiscoverySettings;
/// # use time::OffsetDateTime;
/// let viewer = Viewer::new("me", Vec::new());
/// let mut queue = DiscoveryQueue::new(viewer, DiscoverySettings::default());
/// let ticket = queue.begin_replenish().unwrap();
/// queue.complete_replenish(ticket, SourceBatch::default(), OffsetDateTime::now_utc());
/// queue.complete_replenish(ticket, SourceBatch::default(), OffsetDateTime::now_utc());
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ReplenishTicket {
    generation: u64,
    seq: u64,
}

impl ReplenishTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a successful replenish did to the queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplenishReport {
    /// Candidates appended to the tail.
    pub appended: usize,
    /// Malformed pool entries that were skipped.
    pub skipped_invalid: Vec<ProfileError>,
    /// Lapsed request records the caller should mark in storage.
    pub expired: Vec<ExclusionRecord>,
    /// Candidates dropped by a live match or request.
    pub excluded: usize,
    /// Candidates dropped because they were recently shown.
    pub recently_shown: usize,
    /// Candidates dropped because they were already queued, repeated in the
    /// batch, or the viewer themself.
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplenishOutcome {
    Applied(ReplenishReport),
    /// The ticket predates the last reset or is not the outstanding one; the
    /// batch was ignored.
    Discarded,
}

/// A "suggested for you" list built from one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    /// Best-ranked eligible candidates, at most `suggestion_limit` of them.
    pub candidates: Vec<RankedCandidate>,
    /// Lapsed request records the caller should mark in storage.
    pub expired: Vec<ExclusionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// There was no current candidate; nothing changed.
    Idle,
    /// The next candidate is current.
    Served {
        /// Candidates left in the queue, current included.
        remaining: usize,
        /// `remaining` is at or below the configured low watermark.
        low_watermark: bool,
    },
    /// The last queued candidate was served; a replenish is needed.
    Exhausted,
}

/// Ordered, de-duplicated candidates for one viewer session.
#[derive(Debug, Clone)]
pub struct DiscoveryQueue {
    viewer: Viewer,
    settings: DiscoverySettings,
    filter: ExclusionFilter,
    items: VecDeque<RankedCandidate>,
    recency: RecencyWindow,
    generation: u64,
    /// Sequence number of the outstanding ticket.
    in_flight: Option<u64>,
    next_seq: u64,
}

// Ticket numbering is not part of the queue's observable state.
impl PartialEq for DiscoveryQueue {
    fn eq(&self, other: &Self) -> bool {
        self.viewer == other.viewer
            && self.settings == other.settings
            && self.filter == other.filter
            && self.items == other.items
            && self.recency == other.recency
            && self.generation == other.generation
            && self.in_flight == other.in_flight
    }
}

impl DiscoveryQueue {
    pub fn new(viewer: Viewer, settings: DiscoverySettings) -> Self {
        Self {
            filter: ExclusionFilter::from_settings(&settings),
            recency: RecencyWindow::new(settings.recency_cap),
            viewer,
            settings,
            items: VecDeque::new(),
            generation: 0,
            in_flight: None,
            next_seq: 0,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub fn state(&self) -> QueueState {
        if !self.items.is_empty() {
            QueueState::Ready
        } else if self.in_flight.is_some() {
            QueueState::Loading
        } else {
            QueueState::Empty
        }
    }

    /// The candidate to show now, without consuming it.
    pub fn current(&self) -> Option<&RankedCandidate> {
        self.items.front()
    }

    /// Queued candidates, current first.
    pub fn queued(&self) -> impl Iterator<Item = &RankedCandidate> {
        self.items.iter()
    }

    /// Number of queued candidates, current included.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn recency(&self) -> &RecencyWindow {
        &self.recency
    }

    /// True while a replenish ticket is outstanding.
    pub fn is_replenishing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Move past the current candidate, recording it as recently shown.
    ///
    /// A no-op when nothing is current. Returns `Busy` if nothing is current
    /// because a blocking load is still in flight.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, DiscoveryError> {
        let Some(served) = self.items.pop_front() else {
            if self.in_flight.is_some() {
                return Err(DiscoveryError::Busy);
            }
            return Ok(AdvanceOutcome::Idle);
        };

        let served_id = served.profile.id;
        tracing::debug!(viewer = %self.viewer.id, served = %served_id, "advanced");
        if let Some(evicted) = self.recency.record(served_id) {
            tracing::trace!(evicted = %evicted, "recency window full");
        }

        let remaining = self.items.len();
        if remaining == 0 {
            return Ok(AdvanceOutcome::Exhausted);
        }
        Ok(AdvanceOutcome::Served {
            remaining,
            low_watermark: remaining <= self.settings.low_watermark,
        })
    }

    /// Start a replenish. Only one may be outstanding at a time.
    pub fn begin_replenish(&mut self) -> Result<ReplenishTicket, DiscoveryError> {
        if self.in_flight.is_some() {
            return Err(DiscoveryError::Busy);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);
        Ok(ReplenishTicket {
            generation: self.generation,
            seq,
        })
    }

    /// Fold a fetched batch into the queue.
    pub fn complete_replenish(
        &mut self,
        ticket: ReplenishTicket,
        batch: SourceBatch,
        now: OffsetDateTime,
    ) -> ReplenishOutcome {
        if !self.is_outstanding(&ticket) {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale replenish"
            );
            return ReplenishOutcome::Discarded;
        }
        self.in_flight = None;
        ReplenishOutcome::Applied(self.ingest(batch, now))
    }

    /// Release a ticket whose fetch failed. Queue contents are untouched.
    pub fn fail_replenish(
        &mut self,
        ticket: ReplenishTicket,
        error: DiscoveryError,
    ) -> DiscoveryError {
        if self.is_outstanding(&ticket) {
            self.in_flight = None;
        }
        tracing::warn!(viewer = %self.viewer.id, error = %error, "replenish failed");
        error
    }

    /// Begin and complete a replenish in one step.
    pub fn load(
        &mut self,
        batch: SourceBatch,
        now: OffsetDateTime,
    ) -> Result<ReplenishReport, DiscoveryError> {
        let ticket = self.begin_replenish()?;
        match self.complete_replenish(ticket, batch, now) {
            ReplenishOutcome::Applied(report) => Ok(report),
            ReplenishOutcome::Discarded => Ok(ReplenishReport::default()),
        }
    }

    /// Forget everything shown and queued, and invalidate in-flight tickets.
    pub fn reset(&mut self) {
        self.items.clear();
        self.recency.clear();
        self.recency.set_capacity(self.settings.recency_cap);
        self.generation += 1;
        self.in_flight = None;
        tracing::info!(viewer = %self.viewer.id, generation = self.generation, "discovery reset");
    }

    /// Rank a batch into a short suggestion list without touching the queue
    /// or the recency window.
    pub fn suggest(&self, batch: SourceBatch, now: OffsetDateTime) -> Suggestions {
        let (unique, _, _) = self.unique_candidates(batch.pool);
        let outcome = self
            .filter
            .apply(unique, &batch.exclusions, &RecencyWindow::new(1), now);
        Suggestions {
            candidates: suggestions(
                &outcome.eligible,
                &self.viewer.interested_skills,
                self.settings.suggestion_limit,
            ),
            expired: outcome.expired,
        }
    }

    fn is_outstanding(&self, ticket: &ReplenishTicket) -> bool {
        ticket.generation == self.generation && self.in_flight == Some(ticket.seq)
    }

    /// Validate a pool and drop the viewer and repeated ids.
    fn unique_candidates(
        &self,
        pool: Vec<RawCandidate>,
    ) -> (Vec<CandidateProfile>, Vec<ProfileError>, usize) {
        let (profiles, skipped_invalid) = sanitize_pool(pool);

        let mut seen: HashSet<ProfileId> = HashSet::new();
        let mut duplicates = 0;
        let unique = profiles
            .into_iter()
            .filter(|p| {
                let keep = p.id != self.viewer.id && seen.insert(p.id.clone());
                if !keep {
                    duplicates += 1;
                }
                keep
            })
            .collect();
        (unique, skipped_invalid, duplicates)
    }

    fn ingest(&mut self, batch: SourceBatch, now: OffsetDateTime) -> ReplenishReport {
        let (unique, skipped_invalid, duplicates) = self.unique_candidates(batch.pool);

        let outcome = self.filter.apply(unique, &batch.exclusions, &self.recency, now);

        if self.settings.adaptive_recency {
            let bound = RecencyWindow::bound_for_eligible(outcome.eligible_total());
            self.recency.set_capacity(bound);
        }

        let eligible = outcome.eligible.len();
        let queued: HashSet<&ProfileId> = self.items.iter().map(|r| &r.profile.id).collect();
        let fresh: Vec<_> = outcome
            .eligible
            .into_iter()
            .filter(|p| !queued.contains(&p.id))
            .collect();
        let already_queued = eligible - fresh.len();

        let ranked = rank(&fresh, &self.viewer.interested_skills);
        let appended = ranked.len();
        self.items.extend(ranked);

        let report = ReplenishReport {
            appended,
            skipped_invalid,
            expired: outcome.expired,
            excluded: outcome.excluded,
            recently_shown: outcome.recently_shown,
            duplicates: duplicates + already_queued,
        };
        tracing::debug!(
            viewer = %self.viewer.id,
            appended = report.appended,
            excluded = report.excluded,
            recently_shown = report.recently_shown,
            duplicates = report.duplicates,
            skipped = report.skipped_invalid.len(),
            "replenished"
        );
        report
    }
}
