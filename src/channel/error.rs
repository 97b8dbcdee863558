//! Errors raised by [`DatagramChannel`](crate::channel::DatagramChannel)
//! operations.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Unrecoverable socket failures. Packet loss is never reported here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The OS refused to create the socket.
    #[error("failed to create socket: {0}")]
    Socket(#[source] io::Error),
    /// Applying socket options failed.
    #[error("failed to configure socket: {0}")]
    Configure(#[source] io::Error),
    /// Binding the local address failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The socket could not be registered for readiness notifications.
    #[error("failed to register socket for readiness: {0}")]
    Register(#[source] io::Error),
    /// Waiting for readiness failed.
    #[error("readiness poll failed: {0}")]
    Poll(#[source] io::Error),
    /// Reading a datagram failed.
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),
    /// Writing a datagram failed.
    #[error("send to {peer} failed: {source}")]
    Send {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Errors building an outbound [`Datagram`](crate::channel::Datagram).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DatagramError {
    /// The payload does not fit in a single datagram.
    #[error("datagram payload of {len} bytes exceeds capacity of {capacity} bytes")]
    TooLarge { len: usize, capacity: usize },
}
