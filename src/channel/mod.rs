//! UDP datagram channel with bounded readiness waits.
//!
//! [`DatagramChannel`] owns one non-blocking UDP socket and a readiness
//! poller. Callers wait for readability with a bounded timeout, then read
//! datagrams until the socket would block. Loss, duplication and reordering
//! pass through untouched; only unrecoverable socket failures surface as
//! [`TransportError`].

mod config;
mod datagram;
mod error;

use std::{
    io,
    net::{SocketAddr, UdpSocket as StdUdpSocket},
    time::Duration,
};

use bytes::Bytes;
use mio::{Events, Interest, Poll, Token, net::UdpSocket};
use socket2::{Domain, Protocol, Socket, Type};

pub use self::{
    config::ChannelConfig,
    datagram::{DATAGRAM_CAPACITY, Datagram},
    error::{DatagramError, TransportError},
};
use crate::metrics::{self, Direction};

const SOCKET_TOKEN: Token = Token(0);
const EVENT_CAPACITY: usize = 8;

/// Unconnected UDP endpoint exchanging datagrams of at most
/// [`DATAGRAM_CAPACITY`] bytes.
///
/// The socket and poller are released when the channel is dropped. A failed
/// [`bind`](Self::bind) releases whatever it had already opened.
#[derive(Debug)]
pub struct DatagramChannel {
    socket: UdpSocket,
    poll: Poll,
    events: Events,
    local_addr: SocketAddr,
    // Readiness is edge-triggered: stay readable until a read would block.
    readable: bool,
    // One spare byte reveals datagrams above capacity.
    recv_buf: Box<[u8]>,
}

impl DatagramChannel {
    /// Create, configure and bind a socket.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the socket cannot be created,
    /// configured, bound or registered with the poller.
    pub fn bind(config: &ChannelConfig) -> Result<Self, TransportError> {
        let addr = config.bind_addr();
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
            .map_err(TransportError::Socket)?;
        config.apply(&socket).map_err(TransportError::Configure)?;
        socket
            .set_nonblocking(true)
            .map_err(TransportError::Configure)?;
        socket
            .bind(&addr.into())
            .map_err(|source| TransportError::Bind { addr, source })?;

        let mut socket = UdpSocket::from_std(StdUdpSocket::from(socket));
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::Bind { addr, source })?;
        let poll = Poll::new().map_err(TransportError::Poll)?;
        poll.registry()
            .register(&mut socket, SOCKET_TOKEN, Interest::READABLE)
            .map_err(TransportError::Register)?;

        tracing::debug!(%local_addr, "datagram channel bound");
        Ok(Self {
            socket,
            poll,
            events: Events::with_capacity(EVENT_CAPACITY),
            local_addr,
            readable: false,
            recv_buf: vec![0_u8; DATAGRAM_CAPACITY + 1].into_boxed_slice(),
        })
    }

    /// Address the socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr { self.local_addr }

    /// Wait up to `timeout` for a datagram to become available.
    ///
    /// A zero `timeout` polls without blocking. A signal interrupting the
    /// wait reports `false`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Poll`] when the readiness poll fails.
    pub fn wait_readable(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        if self.readable {
            return Ok(true);
        }

        match self.poll.poll(&mut self.events, Some(timeout)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return Ok(false),
            Err(err) => return Err(TransportError::Poll(err)),
        }

        self.readable = self
            .events
            .iter()
            .any(|event| event.token() == SOCKET_TOKEN && event.is_readable());
        Ok(self.readable)
    }

    /// Read one datagram without blocking.
    ///
    /// Datagrams above [`DATAGRAM_CAPACITY`], interrupted reads and
    /// ICMP-induced errors are skipped and the read continues. Returns
    /// `Ok(None)` only once the socket would block.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Receive`] on unrecoverable socket errors.
    pub fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        loop {
            let (len, peer) = match self.socket.recv_from(&mut self.recv_buf) {
                Ok(received) => received,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    self.readable = false;
                    return Ok(None);
                }
                Err(err) if is_transient(&err) => {
                    tracing::debug!(error = %err, "ignoring transient receive error");
                    continue;
                }
                Err(err) => return Err(TransportError::Receive(err)),
            };

            metrics::inc_datagrams(Direction::Inbound);
            let Some(bytes) = self.recv_buf.get(..len).filter(|_| len <= DATAGRAM_CAPACITY) else {
                tracing::warn!(
                    %peer,
                    capacity = DATAGRAM_CAPACITY,
                    "dropping datagram above capacity"
                );
                metrics::inc_fragments_dropped("datagram_too_large");
                continue;
            };

            tracing::trace!(%peer, len, "datagram received");
            if let Ok(datagram) = Datagram::new(peer, Bytes::copy_from_slice(bytes)) {
                return Ok(Some(datagram));
            }
        }
    }

    /// Send a datagram, best effort.
    ///
    /// A full send buffer drops the datagram silently, as UDP would.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] on unrecoverable socket errors.
    pub fn send(&self, datagram: &Datagram) -> Result<(), TransportError> {
        let peer = datagram.peer();
        match self.socket.send_to(datagram.payload(), peer) {
            Ok(_) => {
                metrics::inc_datagrams(Direction::Outbound);
                tracing::trace!(%peer, len = datagram.payload().len(), "datagram sent");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock || is_transient(&err) => {
                tracing::debug!(%peer, error = %err, "datagram dropped on send");
                Ok(())
            }
            Err(source) => Err(TransportError::Send { peer, source }),
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
    )
}
