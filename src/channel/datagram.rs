use std::net::SocketAddr;

use bytes::Bytes;

use super::DatagramError;

/// Hard ceiling on datagram payload size, kept small enough to avoid IP
/// fragmentation on any realistic path.
pub const DATAGRAM_CAPACITY: usize = 512;

/// A single received or outbound UDP datagram.
///
/// # Examples
///
/// ```
/// use blobwire::channel::{DATAGRAM_CAPACITY, Datagram};
///
/// let peer = "127.0.0.1:9000".parse().expect("valid address");
/// let datagram = Datagram::new(peer, vec![1_u8, 2, 3]).expect("fits");
/// assert_eq!(datagram.payload(), &[1, 2, 3]);
/// assert!(Datagram::new(peer, vec![0_u8; DATAGRAM_CAPACITY + 1]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datagram {
    peer: SocketAddr,
    payload: Bytes,
}

impl Datagram {
    /// Build a datagram addressed to (or received from) `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`DatagramError::TooLarge`] when `payload` exceeds
    /// [`DATAGRAM_CAPACITY`].
    pub fn new(peer: SocketAddr, payload: impl Into<Bytes>) -> Result<Self, DatagramError> {
        let payload = payload.into();
        if payload.len() > DATAGRAM_CAPACITY {
            return Err(DatagramError::TooLarge {
                len: payload.len(),
                capacity: DATAGRAM_CAPACITY,
            });
        }
        Ok(Self { peer, payload })
    }

    /// Remote address the datagram came from or is sent to.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr { self.peer }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Consume the datagram, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }
}
