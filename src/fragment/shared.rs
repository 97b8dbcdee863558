//! Cross-thread handle for splitting fragment intake from blob consumption.
//!
//! A network thread calls [`SharedBlobAssembler::add_fragment`] while a
//! decode thread calls [`SharedBlobAssembler::drain_blobs`]. Both touch the
//! same ready set, so every operation runs under one mutex.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use super::{
    AssemblerConfig,
    Blob,
    BlobAssembler,
    FragmentHeader,
    FragmentStatus,
    MalformedFragment,
    StaleBlobEvicted,
};

/// Cloneable, mutex-guarded [`BlobAssembler`].
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use blobwire::fragment::{BlobId, FragmentHeader, QueueId, SharedBlobAssembler};
///
/// let shared = SharedBlobAssembler::default();
/// let producer = shared.clone();
/// thread::spawn(move || {
///     let header = FragmentHeader::new(BlobId::new(1), 1, 2, 0, QueueId::new(0));
///     producer.add_fragment(&header, b"hi").expect("valid fragment");
/// })
/// .join()
/// .expect("producer thread");
///
/// assert_eq!(shared.drain_blobs().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedBlobAssembler {
    inner: Arc<Mutex<BlobAssembler>>,
}

impl SharedBlobAssembler {
    /// Create a shared assembler with the given limits.
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BlobAssembler::new(config))),
        }
    }

    /// Ingest a fragment. See [`BlobAssembler::add_fragment`].
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFragment`] for rejected fragments.
    pub fn add_fragment(
        &self,
        header: &FragmentHeader,
        payload: &[u8],
    ) -> Result<FragmentStatus, MalformedFragment> {
        self.lock().add_fragment(header, payload)
    }

    /// Ingest a fragment at an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFragment`] for rejected fragments.
    pub fn add_fragment_at(
        &self,
        header: &FragmentHeader,
        payload: &[u8],
        now: Instant,
    ) -> Result<FragmentStatus, MalformedFragment> {
        self.lock().add_fragment_at(header, payload, now)
    }

    /// Hand over every completed blob. See [`BlobAssembler::drain_blobs`].
    #[must_use]
    pub fn drain_blobs(&self) -> Vec<Blob> { self.lock().drain_blobs() }

    /// Evict stale partial blobs. See [`BlobAssembler::purge_stale`].
    pub fn purge_stale(&self) -> Vec<StaleBlobEvicted> { self.lock().purge_stale() }

    /// Number of partial blobs currently buffered.
    #[must_use]
    pub fn partial_len(&self) -> usize { self.lock().partial_len() }

    /// Run `f` with exclusive access to the underlying assembler.
    pub fn with<R>(&self, f: impl FnOnce(&mut BlobAssembler) -> R) -> R { f(&mut self.lock()) }

    // Every assembler method leaves consistent state on return, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, BlobAssembler> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<BlobAssembler> for SharedBlobAssembler {
    fn from(assembler: BlobAssembler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(assembler)),
        }
    }
}
