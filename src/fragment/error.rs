//! Error and status types emitted by the fragmentation layer.
//!
//! Inbound problems are described by [`MalformedFragment`]; the assembler and
//! endpoint log and count them but never treat them as fatal. Outbound
//! splitting reports [`FragmentationError`].

use std::num::NonZeroUsize;

use thiserror::Error;

use super::{BlobId, FRAGMENT_HEADER_LEN, QueueId};

/// Result of feeding a fragment into a
/// [`BlobAssembler`](crate::fragment::BlobAssembler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentStatus {
    /// The blob still expects more fragments.
    Incomplete,
    /// The fragment completed the blob, which is now ready to drain.
    Complete,
    /// The fragment repeated data already received and was ignored.
    Duplicate,
}

/// Reasons a fragment or datagram is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MalformedFragment {
    /// The datagram is larger than the channel capacity.
    #[error("datagram of {len} bytes exceeds capacity of {capacity} bytes")]
    DatagramTooLarge { len: usize, capacity: usize },
    /// The datagram cannot hold a fragment header.
    #[error("datagram of {len} bytes is shorter than the {header}-byte fragment header", header = FRAGMENT_HEADER_LEN)]
    Truncated { len: usize },
    /// The declared payload size differs from the bytes carried.
    #[error("fragment of blob {id} declares {declared} payload bytes but carries {actual}")]
    SizeMismatch {
        id: BlobId,
        declared: u16,
        actual: usize,
    },
    /// The header claims a blob of zero fragments.
    #[error("fragment of blob {id} declares a fragment count of zero")]
    ZeroCount { id: BlobId },
    /// The fragment position lies outside the declared count.
    #[error("fragment of blob {id} has index {index} outside count {count}")]
    IndexOutOfRange { id: BlobId, index: u16, count: u16 },
    /// The payload exceeds the per-fragment limit.
    #[error("fragment of blob {id} carries {size} bytes, above the {limit}-byte limit")]
    PayloadTooLarge { id: BlobId, size: usize, limit: usize },
    /// The header disagrees with the partial blob already being assembled.
    #[error(
        "fragment of blob {id} has count {count} on queue {queue_id}, partial blob expects count \
         {expected_count} on queue {expected_queue_id}"
    )]
    InconsistentHeader {
        id: BlobId,
        count: u16,
        queue_id: QueueId,
        expected_count: u16,
        expected_queue_id: QueueId,
    },
    /// Accepting the fragment would grow the blob beyond the configured cap.
    #[error("blob {id} would grow to {attempted} bytes, above the {limit}-byte limit")]
    BlobTooLarge {
        id: BlobId,
        attempted: usize,
        limit: NonZeroUsize,
    },
}

/// Errors produced while fragmenting outbound blobs.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentationError {
    /// The payload needs more fragments than a `u16` count can describe.
    #[error("payload of {len} bytes needs {required} fragments, above the limit of {limit}", limit = u16::MAX)]
    TooManyFragments { len: usize, required: usize },
}

impl MalformedFragment {
    /// Short, stable label used when counting dropped fragments.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::DatagramTooLarge { .. } => "datagram_too_large",
            Self::Truncated { .. } => "truncated",
            Self::SizeMismatch { .. } => "size_mismatch",
            Self::ZeroCount { .. } => "zero_count",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::InconsistentHeader { .. } => "inconsistent_header",
            Self::BlobTooLarge { .. } => "blob_too_large",
        }
    }
}
