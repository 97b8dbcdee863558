//! Outbound helper that splits blobs into datagram-sized fragments.
//!
//! [`Fragmenter`] chunks a payload into fragments no larger than the
//! configured cap and tags each with a [`FragmentHeader`] following the same
//! `count`/`index`/`size` scheme the assembler expects. It hands out unique
//! [`BlobId`] values so callers need not track identifiers themselves.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;

use super::{
    BlobId,
    FragmentHeader,
    FragmentationError,
    MAX_FRAGMENT_PAYLOAD,
    QueueId,
    encode_fragment,
};

/// Splits outbound blobs into fragments.
#[derive(Debug)]
pub struct Fragmenter {
    max_fragment_payload: NonZeroUsize,
    next_blob_id: AtomicU64,
}

impl Fragmenter {
    /// Create a fragmenter capping fragment payloads at
    /// `max_fragment_payload` bytes, starting at blob id 0.
    #[must_use]
    pub const fn new(max_fragment_payload: NonZeroUsize) -> Self {
        Self::with_starting_id(max_fragment_payload, BlobId::new(0))
    }

    /// Create a fragmenter whose first blob uses `start_at`.
    #[must_use]
    pub const fn with_starting_id(max_fragment_payload: NonZeroUsize, start_at: BlobId) -> Self {
        Self {
            max_fragment_payload,
            next_blob_id: AtomicU64::new(start_at.get()),
        }
    }

    /// Return the maximum fragment payload size in bytes.
    #[must_use]
    pub const fn max_fragment_payload(&self) -> NonZeroUsize { self.max_fragment_payload }

    /// Generate and return the next [`BlobId`]. Identifiers wrap at `u64::MAX`.
    #[must_use]
    pub fn next_blob_id(&self) -> BlobId {
        BlobId::new(self.next_blob_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Split `payload` into fragments under a fresh [`BlobId`].
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::TooManyFragments`] when the payload
    /// needs more than `u16::MAX` fragments.
    pub fn fragment(
        &self,
        queue_id: QueueId,
        payload: impl AsRef<[u8]>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let id = self.next_blob_id();
        self.fragment_with_id(id, queue_id, payload)
    }

    /// Split `payload` into fragments tagged with `id`.
    ///
    /// The payload is copied once; every fragment is a slice of that copy.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::TooManyFragments`] when the payload
    /// needs more than `u16::MAX` fragments.
    pub fn fragment_with_id(
        &self,
        id: BlobId,
        queue_id: QueueId,
        payload: impl AsRef<[u8]>,
    ) -> Result<FragmentBatch, FragmentationError> {
        let whole = Bytes::copy_from_slice(payload.as_ref());
        // Fragments never exceed what a datagram can carry.
        let max = self.max_fragment_payload.get().min(MAX_FRAGMENT_PAYLOAD);
        let required = whole.len().div_ceil(max).max(1);
        let count = u16::try_from(required).map_err(|_| FragmentationError::TooManyFragments {
            len: whole.len(),
            required,
        })?;

        let frames = (0..count)
            .map(|index| {
                let start = usize::from(index) * max;
                let part = whole.slice(start..whole.len().min(start + max));
                // `max` is at most `MAX_FRAGMENT_PAYLOAD`, well inside `u16`.
                let size = u16::try_from(part.len()).unwrap_or(u16::MAX);
                FragmentFrame::new(FragmentHeader::new(id, count, size, index, queue_id), part)
            })
            .collect();

        Ok(FragmentBatch { id, frames })
    }
}

const DEFAULT_FRAGMENT_PAYLOAD: NonZeroUsize =
    NonZeroUsize::new(MAX_FRAGMENT_PAYLOAD).expect("datagram capacity exceeds header length");

impl Default for Fragmenter {
    fn default() -> Self { Self::new(DEFAULT_FRAGMENT_PAYLOAD) }
}

/// One outbound fragment: its header and a slice of the blob payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentFrame {
    header: FragmentHeader,
    payload: Bytes,
}

impl FragmentFrame {
    /// Pair a header with its payload bytes.
    #[must_use]
    pub fn new(header: FragmentHeader, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Header describing this fragment.
    #[must_use]
    pub const fn header(&self) -> FragmentHeader { self.header }

    /// Payload bytes carried by this fragment.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Datagram bytes: the encoded header followed by the payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> { encode_fragment(&self.header, &self.payload) }

    /// Split the frame into its header and payload.
    #[must_use]
    pub fn into_parts(self) -> (FragmentHeader, Bytes) { (self.header, self.payload) }
}

/// Every fragment of one outbound blob, in index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    id: BlobId,
    frames: Vec<FragmentFrame>,
}

impl FragmentBatch {
    /// Identifier carried by each fragment.
    #[must_use]
    pub const fn id(&self) -> BlobId { self.id }

    /// Fragments in index order.
    #[must_use]
    pub fn frames(&self) -> &[FragmentFrame] { &self.frames }

    /// Number of fragments; never zero.
    #[expect(
        clippy::len_without_is_empty,
        reason = "fragmentation always yields at least one frame"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether the blob needed more than one datagram.
    #[must_use]
    pub fn is_fragmented(&self) -> bool { self.frames.len() > 1 }

    /// Iterate over the fragments in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, FragmentFrame> { self.frames.iter() }
}

impl IntoIterator for FragmentBatch {
    type Item = FragmentFrame;
    type IntoIter = std::vec::IntoIter<FragmentFrame>;

    fn into_iter(self) -> Self::IntoIter { self.frames.into_iter() }
}

impl<'a> IntoIterator for &'a FragmentBatch {
    type Item = &'a FragmentFrame;
    type IntoIter = std::slice::Iter<'a, FragmentFrame>;

    fn into_iter(self) -> Self::IntoIter { self.frames.iter() }
}
