use derive_more::{Display, From, Into};

/// Identifier shared by every fragment of one blob.
///
/// # Examples
///
/// ```
/// use blobwire::fragment::BlobId;
/// let id = BlobId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct BlobId(u64);

impl BlobId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// Logical sub-channel a reassembled blob is routed to.
///
/// # Examples
///
/// ```
/// use blobwire::fragment::QueueId;
/// let queue = QueueId::new(3);
/// assert_eq!(queue.get(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct QueueId(u16);

impl QueueId {
    /// Create a new queue identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }
}
