//! Single-threaded polling loop tying a channel to an assembler.
//!
//! [`BlobEndpoint`] is the intended way to drive the transport: call
//! [`poll`](BlobEndpoint::poll) with a bounded timeout, then
//! [`drain_blobs`](BlobEndpoint::drain_blobs) to collect finished blobs.
//! Malformed datagrams are logged, counted and dropped; only socket failures
//! reach the caller.

use std::{net::SocketAddr, num::NonZeroUsize, time::Duration};

use thiserror::Error;

use crate::{
    channel::{ChannelConfig, Datagram, DatagramChannel, DatagramError, TransportError},
    fragment::{
        AssemblerConfig,
        Blob,
        BlobAssembler,
        BlobId,
        FragmentationError,
        Fragmenter,
        QueueId,
        parse_datagram,
    },
    metrics,
};

const DEFAULT_RECEIVE_BUDGET: NonZeroUsize = NonZeroUsize::new(256).expect("non-zero");

/// Errors returned by [`BlobEndpoint::send_blob`].
#[derive(Debug, Error)]
pub enum SendError {
    /// The payload could not be split into fragments.
    #[error("fragmentation failed: {0}")]
    Fragmentation(#[from] FragmentationError),
    /// An encoded fragment did not fit in a datagram.
    #[error("datagram construction failed: {0}")]
    Datagram(#[from] DatagramError),
    /// The socket failed while sending.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A datagram channel, blob assembler and fragmenter driven together.
#[derive(Debug)]
pub struct BlobEndpoint {
    channel: DatagramChannel,
    assembler: BlobAssembler,
    fragmenter: Fragmenter,
    receive_budget: NonZeroUsize,
}

impl BlobEndpoint {
    /// Bind a channel and create an assembler with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the socket cannot be set up.
    pub fn bind(
        channel: &ChannelConfig,
        assembler: AssemblerConfig,
    ) -> Result<Self, TransportError> {
        let channel = DatagramChannel::bind(channel)?;
        Ok(Self::from_parts(channel, BlobAssembler::new(assembler)))
    }

    /// Assemble an endpoint from an existing channel and assembler.
    #[must_use]
    pub fn from_parts(channel: DatagramChannel, assembler: BlobAssembler) -> Self {
        Self {
            channel,
            assembler,
            fragmenter: Fragmenter::default(),
            receive_budget: DEFAULT_RECEIVE_BUDGET,
        }
    }

    /// Replace the outbound fragmenter, for example to start at a specific
    /// blob id.
    #[must_use]
    pub fn with_fragmenter(mut self, fragmenter: Fragmenter) -> Self {
        self.fragmenter = fragmenter;
        self
    }

    /// Cap the number of datagrams read by a single [`poll`](Self::poll).
    #[must_use]
    pub fn with_receive_budget(mut self, budget: NonZeroUsize) -> Self {
        self.receive_budget = budget;
        self
    }

    /// Address the underlying socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr { self.channel.local_addr() }

    /// Borrow the assembler, for introspection.
    #[must_use]
    pub const fn assembler(&self) -> &BlobAssembler { &self.assembler }

    /// Wait up to `timeout` for datagrams, then ingest everything queued.
    ///
    /// Reads stop when the socket would block or the receive budget is
    /// spent. Idle calls still sweep stale partial blobs. Returns the number
    /// of datagrams read.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on unrecoverable socket failures.
    pub fn poll(&mut self, timeout: Duration) -> Result<usize, TransportError> {
        let mut read = 0;
        if self.channel.wait_readable(timeout)? {
            while read < self.receive_budget.get() {
                let Some(datagram) = self.channel.receive()? else {
                    break;
                };
                read += 1;
                self.ingest(&datagram);
            }
        }

        if read == 0 {
            self.assembler.purge_stale();
        }
        Ok(read)
    }

    /// Hand over every completed blob in completion order.
    #[must_use]
    pub fn drain_blobs(&mut self) -> Vec<Blob> { self.assembler.drain_blobs() }

    /// Fragment `payload` and send every fragment to `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] when the payload needs too many fragments or
    /// the socket fails.
    pub fn send_blob(
        &self,
        peer: SocketAddr,
        queue_id: QueueId,
        payload: impl AsRef<[u8]>,
    ) -> Result<BlobId, SendError> {
        let batch = self.fragmenter.fragment(queue_id, payload)?;
        let id = batch.id();
        let fragments = batch.len();
        for frame in batch {
            let datagram = Datagram::new(peer, frame.encode())?;
            self.channel.send(&datagram)?;
        }
        tracing::debug!(blob_id = %id, %queue_id, %peer, fragments, "blob sent");
        Ok(id)
    }

    fn ingest(&mut self, datagram: &Datagram) {
        match parse_datagram(datagram.payload()) {
            Ok((header, payload)) => {
                // Rejections are logged and counted by the assembler.
                let _ = self.assembler.add_fragment(&header, payload);
            }
            Err(err) => {
                tracing::warn!(peer = %datagram.peer(), error = %err, "dropping malformed datagram");
                metrics::inc_fragments_dropped(err.reason());
            }
        }
    }
}
