use std::fmt;

use skillswap_matching::ProfileError;

/// Which external capability failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pool,
    Exclusions,
    Expiry,
    /// The fetch task itself panicked or was cancelled.
    Fetch,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Pool => "candidate pool",
            SourceKind::Exclusions => "exclusion list",
            SourceKind::Expiry => "expiry reporter",
            SourceKind::Fetch => "fetch task",
        };
        f.write_str(label)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// An external fetch failed (network, permission, backend outage).
    #[error("{source_kind} unavailable: {message}")]
    DataUnavailable {
        source_kind: SourceKind,
        message: String,
    },
    /// A pool entry cannot be ranked. Batches skip these rather than fail.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(#[from] ProfileError),
    /// Another replenish is still in flight.
    #[error("a replenish is already in flight")]
    Busy,
}

impl DiscoveryError {
    pub fn unavailable(source_kind: SourceKind, message: impl fmt::Display) -> Self {
        Self::DataUnavailable {
            source_kind,
            message: message.to_string(),
        }
    }

    /// True when the consumer may simply try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. } | Self::Busy)
    }
}
