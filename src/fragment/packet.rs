//! Splitting datagrams into fragment header and payload, and back.
//!
//! One datagram carries exactly one fragment:
//! `[FragmentHeader: 16 bytes][payload: size bytes]`.

use super::{FRAGMENT_HEADER_LEN, FragmentHeader, MalformedFragment};
use crate::channel::DATAGRAM_CAPACITY;

/// Parse a received datagram into its header and payload slice.
///
/// # Examples
///
/// ```
/// use blobwire::fragment::{BlobId, FragmentHeader, QueueId, encode_fragment, parse_datagram};
///
/// let header = FragmentHeader::new(BlobId::new(9), 1, 3, 0, QueueId::new(1));
/// let bytes = encode_fragment(&header, b"XYZ");
/// let (parsed, payload) = parse_datagram(&bytes).expect("well-formed datagram");
/// assert_eq!(parsed, header);
/// assert_eq!(payload, b"XYZ");
/// ```
///
/// # Errors
///
/// Returns [`MalformedFragment::DatagramTooLarge`] when `datagram` exceeds
/// [`DATAGRAM_CAPACITY`], [`MalformedFragment::Truncated`] when it cannot
/// hold a header, and [`MalformedFragment::SizeMismatch`] when the header's
/// `size` disagrees with the bytes that follow it.
pub fn parse_datagram(datagram: &[u8]) -> Result<(FragmentHeader, &[u8]), MalformedFragment> {
    if datagram.len() > DATAGRAM_CAPACITY {
        return Err(MalformedFragment::DatagramTooLarge {
            len: datagram.len(),
            capacity: DATAGRAM_CAPACITY,
        });
    }

    let header = FragmentHeader::decode(datagram)?;
    let payload = datagram.get(FRAGMENT_HEADER_LEN..).unwrap_or_default();
    if usize::from(header.size()) != payload.len() {
        return Err(MalformedFragment::SizeMismatch {
            id: header.id(),
            declared: header.size(),
            actual: payload.len(),
        });
    }

    Ok((header, payload))
}

/// Encode a header and payload into datagram bytes.
///
/// The caller is responsible for keeping `payload` consistent with the
/// header's `size`; [`Fragmenter`](crate::fragment::Fragmenter) always does.
#[must_use]
pub fn encode_fragment(header: &FragmentHeader, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAGMENT_HEADER_LEN + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}
