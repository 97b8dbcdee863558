//! Configuration bounding reassembly resource usage.

use std::{num::NonZeroUsize, time::Duration};

use super::MAX_FRAGMENT_PAYLOAD;

/// Default inactivity window after which a partial blob is evicted.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

/// Default period during which a completed blob id is remembered.
pub const DEFAULT_DUPLICATE_WINDOW: Duration = DEFAULT_STALE_AFTER;

const DEFAULT_MAX_BLOB_SIZE: NonZeroUsize = NonZeroUsize::new(1024 * 1024).expect("non-zero");
const DEFAULT_MAX_PARTIAL_BLOBS: NonZeroUsize = NonZeroUsize::new(1024).expect("non-zero");
const DEFAULT_MAX_REMEMBERED_BLOBS: usize = 4096;

/// Settings that bound fragment sizes and reassembly state.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use blobwire::fragment::AssemblerConfig;
///
/// let config = AssemblerConfig::default().with_stale_after(Duration::from_secs(10));
/// assert_eq!(config.stale_after(), Duration::from_secs(10));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblerConfig {
    stale_after: Duration,
    duplicate_window: Duration,
    max_fragment_payload: usize,
    max_blob_size: NonZeroUsize,
    max_partial_blobs: NonZeroUsize,
    max_remembered_blobs: usize,
}

impl AssemblerConfig {
    /// Inactivity window after which partial blobs are evicted.
    #[must_use]
    pub const fn stale_after(&self) -> Duration { self.stale_after }

    /// How long a completed blob id is remembered to suppress late duplicates.
    #[must_use]
    pub const fn duplicate_window(&self) -> Duration { self.duplicate_window }

    /// Period a completed blob id is actually remembered for.
    ///
    /// The larger of [`duplicate_window`](Self::duplicate_window) and
    /// [`stale_after`](Self::stale_after), so no late duplicate can seed a
    /// partial blob that outlives the memory of its completed id.
    #[must_use]
    pub fn completion_memory(&self) -> Duration { self.duplicate_window.max(self.stale_after) }

    /// Largest payload a single fragment may carry.
    #[must_use]
    pub const fn max_fragment_payload(&self) -> usize { self.max_fragment_payload }

    /// Hard cap on the size of a reassembled blob.
    #[must_use]
    pub const fn max_blob_size(&self) -> NonZeroUsize { self.max_blob_size }

    /// Maximum number of partial blobs held at once.
    #[must_use]
    pub const fn max_partial_blobs(&self) -> NonZeroUsize { self.max_partial_blobs }

    /// Maximum number of completed blob ids remembered for duplicate
    /// suppression. Zero disables the memory.
    #[must_use]
    pub const fn max_remembered_blobs(&self) -> usize { self.max_remembered_blobs }

    /// Set the staleness eviction window.
    #[must_use]
    pub const fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Set the duplicate suppression window.
    #[must_use]
    pub const fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }

    /// Set the per-fragment payload limit.
    ///
    /// Values above [`MAX_FRAGMENT_PAYLOAD`] are clamped, since such
    /// fragments could never arrive in a single datagram.
    #[must_use]
    pub fn with_max_fragment_payload(mut self, limit: usize) -> Self {
        self.max_fragment_payload = limit.min(MAX_FRAGMENT_PAYLOAD);
        self
    }

    /// Set the reassembled blob size cap.
    #[must_use]
    pub const fn with_max_blob_size(mut self, limit: NonZeroUsize) -> Self {
        self.max_blob_size = limit;
        self
    }

    /// Set the maximum number of concurrent partial blobs.
    #[must_use]
    pub const fn with_max_partial_blobs(mut self, limit: NonZeroUsize) -> Self {
        self.max_partial_blobs = limit;
        self
    }

    /// Set how many completed blob ids are remembered.
    #[must_use]
    pub const fn with_max_remembered_blobs(mut self, limit: usize) -> Self {
        self.max_remembered_blobs = limit;
        self
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            duplicate_window: DEFAULT_DUPLICATE_WINDOW,
            max_fragment_payload: MAX_FRAGMENT_PAYLOAD,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
            max_partial_blobs: DEFAULT_MAX_PARTIAL_BLOBS,
            max_remembered_blobs: DEFAULT_MAX_REMEMBERED_BLOBS,
        }
    }
}
