//! Helpers for the protocol's little-endian wire byte order.
//!
//! Fragment headers are laid out in the game client's native byte order
//! (little-endian). Keeping the conversions here means the codec code
//! stays explicit about endianness at each field.

/// Serialise a `u16` in wire byte order.
///
/// # Examples
///
/// ```
/// use blobwire::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u16(value: u16) -> [u8; 2] { value.to_le_bytes() }

/// Parse a wire-order `u16`.
///
/// # Examples
///
/// ```
/// use blobwire::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub fn read_wire_u16(bytes: [u8; 2]) -> u16 { u16::from_le_bytes(bytes) }

/// Serialise a `u64` in wire byte order.
///
/// # Examples
///
/// ```
/// use blobwire::byte_order::write_wire_u64;
///
/// assert_eq!(
///     write_wire_u64(0x1122_3344_5566_7788),
///     [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
/// );
/// ```
#[must_use]
pub fn write_wire_u64(value: u64) -> [u8; 8] { value.to_le_bytes() }

/// Parse a wire-order `u64`.
///
/// # Examples
///
/// ```
/// use blobwire::byte_order::read_wire_u64;
///
/// assert_eq!(
///     read_wire_u64([0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]),
///     0x1122_3344_5566_7788
/// );
/// ```
#[must_use]
pub fn read_wire_u64(bytes: [u8; 8]) -> u64 { u64::from_le_bytes(bytes) }

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{read_wire_u16, read_wire_u64, write_wire_u16, write_wire_u64};

    #[rstest]
    #[case::u16(
        0x0102u64,
        &write_wire_u16(0x0102)[..],
        &[0x02, 0x01],
        u64::from(read_wire_u16([0x02, 0x01]))
    )]
    #[case::u64(
        0x0102_0304_0506_0708u64,
        &write_wire_u64(0x0102_0304_0506_0708)[..],
        &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01],
        read_wire_u64([0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01])
    )]
    fn wire_byte_order_is_little_endian(
        #[case] value: u64,
        #[case] written: &[u8],
        #[case] expected_bytes: &[u8],
        #[case] read_back: u64,
    ) {
        assert_eq!(written, expected_bytes);
        assert_eq!(read_back, value);
    }
}
