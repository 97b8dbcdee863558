//! Inbound engine that stitches fragments back into complete blobs.
//!
//! [`BlobAssembler`] keeps one [`PartialBlob`] per [`BlobId`] and moves
//! finished blobs into a ready set that callers drain in completion order.
//! Fragments may arrive in any order and any number of times. Malformed
//! input is rejected without touching other partial blobs, and partial blobs
//! that stop receiving fragments are evicted after a configurable window.
//! The assembler performs no I/O and is not internally synchronised; see
//! [`SharedBlobAssembler`](crate::fragment::SharedBlobAssembler) for the
//! cross-thread handle.

use std::{
    collections::{HashMap, VecDeque, hash_map::Entry},
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use bytes::Bytes;

use super::{
    AssemblerConfig,
    Blob,
    BlobId,
    FragmentHeader,
    FragmentStatus,
    MalformedFragment,
    QueueId,
    partial::{PartialBlob, SlotWrite},
};
use crate::metrics;

/// Record of a partial blob removed before it completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaleBlobEvicted {
    /// Identifier of the abandoned blob.
    pub id: BlobId,
    /// Queue the blob would have been routed to.
    pub queue_id: QueueId,
    /// Fragments received before eviction.
    pub received: usize,
    /// Fragments the blob declared.
    pub count: u16,
    /// Time since the last fragment arrived.
    pub idle: Duration,
}

/// Stateful fragment reassembler with staleness eviction.
///
/// # Examples
///
/// ```
/// use blobwire::fragment::{BlobAssembler, BlobId, FragmentHeader, FragmentStatus, QueueId};
///
/// let mut assembler = BlobAssembler::default();
/// let id = BlobId::new(7);
/// let queue = QueueId::new(1);
///
/// let parts: [(u16, &[u8]); 3] = [(0, b"ABCD"), (2, b"GH"), (1, b"EF")];
/// for (index, payload) in parts {
///     let size = u16::try_from(payload.len()).expect("small payload");
///     let header = FragmentHeader::new(id, 3, size, index, queue);
///     assembler.add_fragment(&header, payload).expect("valid fragment");
/// }
///
/// let blobs = assembler.drain_blobs();
/// assert_eq!(blobs.len(), 1);
/// assert_eq!(blobs[0].payload(), b"ABCDEFGH");
/// ```
#[derive(Debug)]
pub struct BlobAssembler {
    config: AssemblerConfig,
    partials: HashMap<BlobId, PartialBlob>,
    ready: Vec<Blob>,
    completed: RecentlyCompleted,
}

impl BlobAssembler {
    /// Create an assembler with the given limits.
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            partials: HashMap::new(),
            ready: Vec::new(),
            completed: RecentlyCompleted::default(),
        }
    }

    /// Return the limits this assembler enforces.
    #[must_use]
    pub const fn config(&self) -> &AssemblerConfig { &self.config }

    /// Ingest a fragment using the current time.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFragment`] when the fragment violates a header
    /// invariant, disagrees with the partial blob it targets, or would push
    /// the blob past the size cap. The error is already logged and counted;
    /// callers are expected to drop the fragment and carry on.
    pub fn add_fragment(
        &mut self,
        header: &FragmentHeader,
        payload: &[u8],
    ) -> Result<FragmentStatus, MalformedFragment> {
        self.add_fragment_at(header, payload, Instant::now())
    }

    /// Ingest a fragment using an explicit clock reading.
    ///
    /// Stale partial blobs are swept before the fragment is applied.
    ///
    /// # Errors
    ///
    /// See [`BlobAssembler::add_fragment`].
    pub fn add_fragment_at(
        &mut self,
        header: &FragmentHeader,
        payload: &[u8],
        now: Instant,
    ) -> Result<FragmentStatus, MalformedFragment> {
        self.purge_stale_at(now);

        match self.accept(header, payload, now) {
            Ok(FragmentStatus::Duplicate) => {
                tracing::debug!(
                    blob_id = %header.id(),
                    index = header.index(),
                    "ignoring duplicate fragment"
                );
                metrics::inc_fragments_dropped("duplicate");
                Ok(FragmentStatus::Duplicate)
            }
            Ok(status) => Ok(status),
            Err(err) => {
                tracing::warn!(
                    blob_id = %header.id(),
                    index = header.index(),
                    count = header.count(),
                    error = %err,
                    "dropping malformed fragment"
                );
                metrics::inc_fragments_dropped(err.reason());
                Err(err)
            }
        }
    }

    /// Hand over every completed blob, oldest completion first.
    ///
    /// The ready set is left empty, so a second call without new completions
    /// returns nothing.
    #[must_use]
    pub fn drain_blobs(&mut self) -> Vec<Blob> { std::mem::take(&mut self.ready) }

    /// Evict partial blobs that have been idle for at least the configured
    /// staleness window.
    pub fn purge_stale(&mut self) -> Vec<StaleBlobEvicted> { self.purge_stale_at(Instant::now()) }

    /// Evict stale partial blobs using an explicit clock reading.
    pub fn purge_stale_at(&mut self, now: Instant) -> Vec<StaleBlobEvicted> {
        let stale_after = self.config.stale_after();
        let mut evicted = Vec::new();

        self.partials.retain(|id, partial| {
            let idle = now.saturating_duration_since(partial.last_activity());
            if idle < stale_after {
                return true;
            }
            evicted.push(StaleBlobEvicted {
                id: *id,
                queue_id: partial.queue_id(),
                received: partial.received(),
                count: partial.count(),
                idle,
            });
            false
        });

        for record in &evicted {
            tracing::debug!(
                blob_id = %record.id,
                queue_id = %record.queue_id,
                received = record.received,
                count = record.count,
                idle_ms = u64::try_from(record.idle.as_millis()).unwrap_or(u64::MAX),
                "evicted stale partial blob"
            );
        }
        if !evicted.is_empty() {
            metrics::add_stale_evictions(evicted.len());
        }

        self.completed.prune(
            now,
            self.config.completion_memory(),
            self.config.max_remembered_blobs(),
        );
        evicted
    }

    /// Number of partial blobs currently buffered.
    #[must_use]
    pub fn partial_len(&self) -> usize { self.partials.len() }

    /// Number of completed blobs waiting to be drained.
    #[must_use]
    pub fn ready_len(&self) -> usize { self.ready.len() }

    /// Whether a partial blob with `id` is being assembled.
    #[must_use]
    pub fn contains_partial(&self, id: BlobId) -> bool { self.partials.contains_key(&id) }

    /// Indices still missing from the partial blob `id`, if one exists.
    #[must_use]
    pub fn missing_indices(&self, id: BlobId) -> Option<Vec<u16>> {
        let partial = self.partials.get(&id)?;
        Some(
            (0..partial.count())
                .filter(|index| !partial.has_index(*index))
                .collect(),
        )
    }

    fn accept(
        &mut self,
        header: &FragmentHeader,
        payload: &[u8],
        now: Instant,
    ) -> Result<FragmentStatus, MalformedFragment> {
        header.validate(payload.len(), self.config.max_fragment_payload())?;

        let id = header.id();
        if self.completed.is_duplicate(
            id,
            header.count(),
            now,
            self.config.completion_memory(),
        ) {
            return Ok(FragmentStatus::Duplicate);
        }

        let limit = self.config.max_blob_size();
        if header.is_single() {
            check_blob_size(limit, id, payload.len())?;
            let blob = Blob::new(id, header.queue_id(), Bytes::copy_from_slice(payload));
            self.finish(blob, header.count(), now);
            return Ok(FragmentStatus::Complete);
        }

        if !self.partials.contains_key(&id) {
            check_blob_size(limit, id, payload.len())?;
            self.make_room();
        }

        let mut occupied = match self.partials.entry(id) {
            Entry::Occupied(occupied) => occupied,
            Entry::Vacant(vacant) => {
                let partial = vacant.insert(PartialBlob::new(header.count(), header.queue_id(), now));
                partial.store(header.index(), payload, now);
                return Ok(FragmentStatus::Incomplete);
            }
        };

        let partial = occupied.get();
        if partial.count() != header.count() || partial.queue_id() != header.queue_id() {
            return Err(MalformedFragment::InconsistentHeader {
                id,
                count: header.count(),
                queue_id: header.queue_id(),
                expected_count: partial.count(),
                expected_queue_id: partial.queue_id(),
            });
        }

        if !partial.has_index(header.index()) {
            let attempted = partial.buffered_bytes().saturating_add(payload.len());
            if let Err(err) = check_blob_size(limit, id, attempted) {
                occupied.remove();
                return Err(err);
            }
        }

        if occupied.get_mut().store(header.index(), payload, now) == SlotWrite::Duplicate {
            return Ok(FragmentStatus::Duplicate);
        }
        if !occupied.get().is_complete() {
            return Ok(FragmentStatus::Incomplete);
        }

        let partial = occupied.remove();
        let blob = Blob::new(id, partial.queue_id(), partial.into_payload());
        self.finish(blob, header.count(), now);
        Ok(FragmentStatus::Complete)
    }

    fn finish(&mut self, blob: Blob, count: u16, now: Instant) {
        tracing::trace!(
            blob_id = %blob.id(),
            queue_id = %blob.queue_id(),
            len = blob.payload().len(),
            "blob reassembled"
        );
        metrics::inc_blobs_completed();
        if self.config.max_remembered_blobs() > 0 {
            self.completed.remember(blob.id(), count, now);
        }
        self.ready.push(blob);
    }

    /// Evict the least recently active partial blob when at capacity.
    fn make_room(&mut self) {
        if self.partials.len() < self.config.max_partial_blobs().get() {
            return;
        }
        let Some(oldest) = self
            .partials
            .iter()
            .min_by_key(|(_, partial)| partial.last_activity())
            .map(|(id, _)| *id)
        else {
            return;
        };
        if let Some(partial) = self.partials.remove(&oldest) {
            tracing::debug!(
                blob_id = %oldest,
                received = partial.received(),
                count = partial.count(),
                "partial blob limit reached; evicted least recently active blob"
            );
            metrics::inc_capacity_evictions();
        }
    }
}

impl Default for BlobAssembler {
    fn default() -> Self { Self::new(AssemblerConfig::default()) }
}

fn check_blob_size(
    limit: NonZeroUsize,
    id: BlobId,
    attempted: usize,
) -> Result<(), MalformedFragment> {
    if attempted > limit.get() {
        return Err(MalformedFragment::BlobTooLarge {
            id,
            attempted,
            limit,
        });
    }
    Ok(())
}

/// Bounded memory of recently completed blob ids.
#[derive(Debug, Default)]
struct RecentlyCompleted {
    order: VecDeque<(BlobId, Instant)>,
    entries: HashMap<BlobId, (u16, Instant)>,
}

impl RecentlyCompleted {
    fn remember(&mut self, id: BlobId, count: u16, now: Instant) {
        self.entries.insert(id, (count, now));
        self.order.push_back((id, now));
    }

    fn is_duplicate(&self, id: BlobId, count: u16, now: Instant, window: Duration) -> bool {
        self.entries.get(&id).is_some_and(|(completed_count, at)| {
            *completed_count == count && now.saturating_duration_since(*at) < window
        })
    }

    fn prune(&mut self, now: Instant, window: Duration, capacity: usize) {
        while let Some(&(id, at)) = self.order.front() {
            let expired = now.saturating_duration_since(at) >= window;
            if !expired && self.order.len() <= capacity {
                break;
            }
            self.order.pop_front();
            // A later completion of the same id owns the map entry.
            if self.entries.get(&id).is_some_and(|(_, latest)| *latest == at) {
                self.entries.remove(&id);
            }
        }
    }
}
