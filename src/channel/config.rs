//! Socket options applied before a channel binds.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

use socket2::Socket;

/// Local address and socket options for a
/// [`DatagramChannel`](crate::channel::DatagramChannel).
///
/// The default binds an ephemeral port on all IPv4 interfaces, which is what a
/// game client talking to a remote server needs.
///
/// # Examples
///
/// ```
/// use blobwire::channel::ChannelConfig;
///
/// let config = ChannelConfig::new("127.0.0.1:0".parse().expect("valid address"))
///     .recv_buffer_size(256 * 1024)
///     .reuse_address(true);
/// assert_eq!(config.bind_addr().port(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    bind_addr: SocketAddr,
    send_buffer_size: Option<usize>,
    recv_buffer_size: Option<usize>,
    reuse_address: Option<bool>,
}

impl ChannelConfig {
    /// Bind to `bind_addr` with platform default socket options.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            send_buffer_size: None,
            recv_buffer_size: None,
            reuse_address: None,
        }
    }

    /// Address the channel binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr { self.bind_addr }

    /// Configure the socket send buffer size.
    #[must_use]
    pub const fn send_buffer_size(mut self, size: usize) -> Self {
        self.send_buffer_size = Some(size);
        self
    }

    /// Configure the socket receive buffer size.
    #[must_use]
    pub const fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Configure `SO_REUSEADDR` behaviour on the socket.
    #[must_use]
    pub const fn reuse_address(mut self, enabled: bool) -> Self {
        self.reuse_address = Some(enabled);
        self
    }

    pub(crate) fn apply(&self, socket: &Socket) -> io::Result<()> {
        if let Some(size) = self.send_buffer_size {
            socket.set_send_buffer_size(size)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        if let Some(enabled) = self.reuse_address {
            socket.set_reuse_address(enabled)?;
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self { Self::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))) }
}
