//! Fixed-size fragment header carried at the front of every datagram.
//!
//! The layout is 16 bytes with no padding, little-endian:
//!
//! ```text
//! [id: u64][count: u16][size: u16][index: u16][queue_id: u16]
//! ```

use super::{BlobId, MalformedFragment, QueueId};
use crate::byte_order::{read_wire_u16, read_wire_u64, write_wire_u16, write_wire_u64};

/// Encoded length of a [`FragmentHeader`].
pub const FRAGMENT_HEADER_LEN: usize = 16;

/// Header describing a single fragment of a blob.
///
/// # Examples
///
/// ```
/// use blobwire::fragment::{BlobId, FragmentHeader, QueueId};
/// let header = FragmentHeader::new(BlobId::new(7), 3, 4, 0, QueueId::new(2));
/// assert_eq!(header.id().get(), 7);
/// assert_eq!(header.count(), 3);
/// assert!(!header.is_single());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentHeader {
    id: BlobId,
    count: u16,
    size: u16,
    index: u16,
    queue_id: QueueId,
}

impl FragmentHeader {
    /// Create a new fragment header. Arguments follow the wire order.
    #[must_use]
    pub const fn new(id: BlobId, count: u16, size: u16, index: u16, queue_id: QueueId) -> Self {
        Self {
            id,
            count,
            size,
            index,
            queue_id,
        }
    }

    /// Identifier of the blob this fragment belongs to.
    #[must_use]
    pub const fn id(&self) -> BlobId { self.id }

    /// Total number of fragments composing the blob.
    #[must_use]
    pub const fn count(&self) -> u16 { self.count }

    /// Declared payload length of this fragment.
    #[must_use]
    pub const fn size(&self) -> u16 { self.size }

    /// Zero-based position of this fragment within the blob.
    #[must_use]
    pub const fn index(&self) -> u16 { self.index }

    /// Queue the reassembled blob is routed to.
    #[must_use]
    pub const fn queue_id(&self) -> QueueId { self.queue_id }

    /// Whether this fragment is a complete blob on its own.
    #[must_use]
    pub const fn is_single(&self) -> bool { self.count == 1 }

    /// Encode the header into its wire representation.
    #[must_use]
    pub fn encode(&self) -> [u8; FRAGMENT_HEADER_LEN] {
        let mut buf = [0_u8; FRAGMENT_HEADER_LEN];
        buf[0..8].copy_from_slice(&write_wire_u64(self.id.get()));
        buf[8..10].copy_from_slice(&write_wire_u16(self.count));
        buf[10..12].copy_from_slice(&write_wire_u16(self.size));
        buf[12..14].copy_from_slice(&write_wire_u16(self.index));
        buf[14..16].copy_from_slice(&write_wire_u16(self.queue_id.get()));
        buf
    }

    /// Decode a header from the first [`FRAGMENT_HEADER_LEN`] bytes of `bytes`.
    ///
    /// Trailing bytes are ignored; use
    /// [`parse_datagram`](crate::fragment::parse_datagram) to split a whole
    /// datagram and check the payload length.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFragment::Truncated`] when fewer than
    /// [`FRAGMENT_HEADER_LEN`] bytes are available.
    pub fn decode(bytes: &[u8]) -> Result<Self, MalformedFragment> {
        let truncated = MalformedFragment::Truncated { len: bytes.len() };
        let id = field::<8>(bytes, 0).ok_or(truncated)?;
        let count = field::<2>(bytes, 8).ok_or(truncated)?;
        let size = field::<2>(bytes, 10).ok_or(truncated)?;
        let index = field::<2>(bytes, 12).ok_or(truncated)?;
        let queue_id = field::<2>(bytes, 14).ok_or(truncated)?;

        Ok(Self {
            id: BlobId::new(read_wire_u64(id)),
            count: read_wire_u16(count),
            size: read_wire_u16(size),
            index: read_wire_u16(index),
            queue_id: QueueId::new(read_wire_u16(queue_id)),
        })
    }

    /// Check the header invariants against the payload it arrived with.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFragment`] when `count` is zero, `index` is not
    /// below `count`, the declared `size` differs from `payload_len`, or the
    /// payload exceeds `max_payload`.
    pub fn validate(&self, payload_len: usize, max_payload: usize) -> Result<(), MalformedFragment> {
        if self.count == 0 {
            return Err(MalformedFragment::ZeroCount { id: self.id });
        }
        if self.index >= self.count {
            return Err(MalformedFragment::IndexOutOfRange {
                id: self.id,
                index: self.index,
                count: self.count,
            });
        }
        if usize::from(self.size) != payload_len {
            return Err(MalformedFragment::SizeMismatch {
                id: self.id,
                declared: self.size,
                actual: payload_len,
            });
        }
        if payload_len > max_payload {
            return Err(MalformedFragment::PayloadTooLarge {
                id: self.id,
                size: payload_len,
                limit: max_payload,
            });
        }
        Ok(())
    }
}

fn field<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    bytes.get(offset..offset + N)?.try_into().ok()
}
