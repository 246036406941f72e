//! Async driver that connects a `DiscoveryQueue` to its data sources.
//!
//! The session is the only place that awaits. It owns at most one fetch at a
//! time: either awaited inline (initial load, explicit replenish, queue ran
//! dry) or spawned in the background when the low watermark is reached. A
//! background fetch is folded in on the next call that touches the queue.

use std::sync::Arc;

use skillswap_matching::{RankedCandidate, Viewer};
use skillswap_state::DiscoverySettings;
use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};
use crate::error::{DiscoveryError, SourceKind};
use crate::exclusion::ExclusionRecord;
use crate::queue::{
    AdvanceOutcome, DiscoveryQueue, QueueState, ReplenishOutcome, ReplenishReport,
    ReplenishTicket, SourceBatch,
};
use crate::source::DiscoverySources;

type FetchResult = Result<SourceBatch, DiscoveryError>;

struct PendingFetch {
    ticket: ReplenishTicket,
    handle: JoinHandle<FetchResult>,
}

/// One viewer's discovery session.
///
/// Calls must be serialized by the caller; wrap the session in a
/// `tokio::sync::Mutex` when several tasks share it.
pub struct DiscoverySession {
    queue: DiscoveryQueue,
    sources: DiscoverySources,
    clock: Arc<dyn Clock>,
    pending: Option<PendingFetch>,
    background_error: Option<DiscoveryError>,
}

impl DiscoverySession {
    pub fn new(viewer: Viewer, sources: DiscoverySources, settings: DiscoverySettings) -> Self {
        Self {
            queue: DiscoveryQueue::new(viewer, settings),
            sources,
            clock: Arc::new(SystemClock),
            pending: None,
            background_error: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn queue(&self) -> &DiscoveryQueue {
        &self.queue
    }

    pub fn state(&self) -> QueueState {
        self.queue.state()
    }

    pub fn current(&self) -> Option<&RankedCandidate> {
        self.queue.current()
    }

    /// True while a fetch, inline or background, holds the replenish ticket.
    pub fn is_replenishing(&self) -> bool {
        self.queue.is_replenishing()
    }

    /// The last error from a background fetch, if it has not been taken yet.
    pub fn take_background_error(&mut self) -> Option<DiscoveryError> {
        self.background_error.take()
    }

    /// Initial fetch for a fresh session.
    pub async fn load(&mut self) -> Result<ReplenishReport, DiscoveryError> {
        tracing::debug!(viewer = %self.queue.viewer().id, "loading discovery queue");
        self.replenish().await
    }

    /// Fetch a fresh batch and append its eligible candidates.
    ///
    /// Waits for an outstanding background fetch instead of starting a second
    /// one. On failure the queue is left exactly as it was.
    pub async fn replenish(&mut self) -> Result<ReplenishReport, DiscoveryError> {
        if let Some(pending) = self.pending.take() {
            let result = join(pending.handle).await;
            return self.settle(pending.ticket, result).await;
        }

        let ticket = self.queue.begin_replenish()?;
        let result = self.sources.fetch_batch(&self.queue.viewer().id).await;
        self.settle(ticket, result).await
    }

    /// Move past the current candidate.
    ///
    /// When the queue runs dry this waits for a replenish and returns its
    /// error, if any; the advance itself is kept. At the low watermark a
    /// background fetch is started and the call returns immediately.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, DiscoveryError> {
        self.absorb_finished().await;

        let outcome = self.queue.advance()?;
        match outcome {
            AdvanceOutcome::Exhausted => {
                self.replenish().await?;
            }
            AdvanceOutcome::Served {
                low_watermark: true,
                ..
            } => self.spawn_background(),
            AdvanceOutcome::Served { .. } | AdvanceOutcome::Idle => {}
        }
        Ok(outcome)
    }

    /// Fetch a fresh batch and return the best eligible candidates, up to the
    /// configured suggestion limit. The queue is not touched.
    pub async fn suggestions(&self) -> Result<Vec<RankedCandidate>, DiscoveryError> {
        let batch = self.sources.fetch_batch(&self.queue.viewer().id).await?;
        let suggested = self.queue.suggest(batch, self.clock.now());
        self.report_expired(&suggested.expired).await;
        Ok(suggested.candidates)
    }

    /// Drop everything shown and queued, cancel any fetch, and load again.
    pub async fn reset(&mut self) -> Result<ReplenishReport, DiscoveryError> {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
        self.background_error = None;
        self.queue.reset();
        self.load().await
    }

    fn spawn_background(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Ok(ticket) = self.queue.begin_replenish() else {
            return;
        };
        let sources = self.sources.clone();
        let viewer_id = self.queue.viewer().id.clone();
        tracing::debug!(viewer = %viewer_id, "low watermark reached, replenishing in background");
        let handle = tokio::spawn(async move { sources.fetch_batch(&viewer_id).await });
        self.pending = Some(PendingFetch { ticket, handle });
    }

    async fn absorb_finished(&mut self) {
        if !self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished())
        {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        let result = join(pending.handle).await;
        if let Err(err) = self.settle(pending.ticket, result).await {
            self.background_error = Some(err);
        }
    }

    async fn settle(
        &mut self,
        ticket: ReplenishTicket,
        result: FetchResult,
    ) -> Result<ReplenishReport, DiscoveryError> {
        let batch = match result {
            Ok(batch) => batch,
            Err(err) => return Err(self.queue.fail_replenish(ticket, err)),
        };
        match self.queue.complete_replenish(ticket, batch, self.clock.now()) {
            ReplenishOutcome::Applied(report) => {
                self.report_expired(&report.expired).await;
                Ok(report)
            }
            ReplenishOutcome::Discarded => Ok(ReplenishReport::default()),
        }
    }

    async fn report_expired(&self, records: &[ExclusionRecord]) {
        for record in records {
            if let Err(err) = self.sources.expiry.mark_expired(record).await {
                tracing::warn!(
                    candidate = %record.candidate_id,
                    error = %err,
                    "failed to mark request expired"
                );
            }
        }
    }
}

impl Drop for DiscoverySession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

async fn join(handle: JoinHandle<FetchResult>) -> FetchResult {
    match handle.await {
        Ok(result) => result,
        Err(err) => Err(DiscoveryError::unavailable(SourceKind::Fetch, err)),
    }
}
