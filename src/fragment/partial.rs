//! In-progress reassembly state for a single blob.
//!
//! Each index owns one slot, so completion is decided by which slots are
//! filled rather than by counting arrivals. Duplicated datagrams therefore
//! cannot complete a blob early.

use std::time::Instant;

use bytes::{Bytes, BytesMut};

use super::QueueId;

/// Outcome of storing one fragment payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SlotWrite {
    Stored,
    Duplicate,
}

#[derive(Debug)]
pub(super) struct PartialBlob {
    count: u16,
    queue_id: QueueId,
    slots: Vec<Option<Bytes>>,
    received: usize,
    buffered_bytes: usize,
    last_activity: Instant,
}

impl PartialBlob {
    pub(super) fn new(count: u16, queue_id: QueueId, now: Instant) -> Self {
        Self {
            count,
            queue_id,
            slots: vec![None; usize::from(count)],
            received: 0,
            buffered_bytes: 0,
            last_activity: now,
        }
    }

    pub(super) const fn count(&self) -> u16 { self.count }

    pub(super) const fn queue_id(&self) -> QueueId { self.queue_id }

    pub(super) const fn received(&self) -> usize { self.received }

    pub(super) const fn buffered_bytes(&self) -> usize { self.buffered_bytes }

    pub(super) const fn last_activity(&self) -> Instant { self.last_activity }

    pub(super) fn has_index(&self, index: u16) -> bool {
        self.slots
            .get(usize::from(index))
            .is_some_and(Option::is_some)
    }

    pub(super) fn is_complete(&self) -> bool { self.received == self.slots.len() }

    /// Store `payload` at `index`. A repeated index leaves the first copy in
    /// place. Callers validate `index < count` beforehand.
    pub(super) fn store(&mut self, index: u16, payload: &[u8], now: Instant) -> SlotWrite {
        self.last_activity = now;
        let Some(slot) = self.slots.get_mut(usize::from(index)) else {
            return SlotWrite::Duplicate;
        };
        if slot.is_some() {
            return SlotWrite::Duplicate;
        }
        *slot = Some(Bytes::copy_from_slice(payload));
        self.received += 1;
        self.buffered_bytes += payload.len();
        SlotWrite::Stored
    }

    /// Concatenate all slots in index order.
    pub(super) fn into_payload(self) -> Bytes {
        debug_assert!(self.is_complete(), "partial blob finalised before completion");
        let mut buf = BytesMut::with_capacity(self.buffered_bytes);
        for slot in self.slots.into_iter().flatten() {
            buf.extend_from_slice(&slot);
        }
        buf.freeze()
    }
}
