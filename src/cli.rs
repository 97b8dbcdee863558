//! Command line interface for the `blobwire` diagnostic binary.
//!
//! The binary binds a datagram channel, optionally sends one blob, and logs
//! every blob it reassembles.

use std::net::SocketAddr;

use clap::Parser;

/// Command line arguments for the `blobwire` binary.
#[derive(Debug, Parser)]
#[command(name = "blobwire", version, about = "Receive and reassemble protocol blobs over UDP")]
pub struct Cli {
    /// Local address to bind.
    #[arg(short, long, default_value = "0.0.0.0:0")]
    pub bind: SocketAddr,

    /// Longest single wait for datagrams, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Seconds of inactivity before a partial blob is evicted.
    #[arg(long, default_value_t = 30)]
    pub stale_secs: u64,

    /// Send `message` as one blob to this peer after binding.
    #[arg(long, requires = "message")]
    pub send_to: Option<SocketAddr>,

    /// Payload for `--send-to`.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Queue id used for `--send-to`.
    #[arg(short, long, default_value_t = 0)]
    pub queue: u16,

    /// Exit after this many blobs have been received.
    #[arg(long)]
    pub max_blobs: Option<usize>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}
