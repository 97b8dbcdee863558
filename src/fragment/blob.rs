use bytes::Bytes;

use super::{BlobId, QueueId};

/// A fully reassembled logical message.
///
/// Ownership passes to the caller through
/// [`BlobAssembler::drain_blobs`](crate::fragment::BlobAssembler::drain_blobs);
/// the assembler keeps no reference to it afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    id: BlobId,
    queue_id: QueueId,
    payload: Bytes,
}

impl Blob {
    /// Construct a new [`Blob`].
    #[must_use]
    pub fn new(id: BlobId, queue_id: QueueId, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            queue_id,
            payload: payload.into(),
        }
    }

    /// Identifier shared by the fragments that formed this blob.
    #[must_use]
    pub const fn id(&self) -> BlobId { self.id }

    /// Queue the blob should be routed to.
    #[must_use]
    pub const fn queue_id(&self) -> QueueId { self.queue_id }

    /// Borrow the assembled payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Consume the blob, returning the payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }
}
