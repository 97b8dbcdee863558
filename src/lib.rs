#![doc(html_root_url = "https://docs.rs/blobwire/latest")]
//! Public API for the `blobwire` library.
//!
//! This crate provides the client-side transport for a UDP game protocol:
//! a [`DatagramChannel`] for bounded-wait datagram I/O, the 16-byte
//! [`FragmentHeader`] wire record, and the [`BlobAssembler`] that rebuilds
//! complete blobs from fragments arriving lost, duplicated or out of order.
//! [`BlobEndpoint`] ties them together into a single polling loop.

pub mod byte_order;
pub mod channel;
pub mod endpoint;
pub mod fragment;
pub mod metrics;

pub use channel::{
    ChannelConfig,
    DATAGRAM_CAPACITY,
    Datagram,
    DatagramChannel,
    DatagramError,
    TransportError,
};
pub use endpoint::{BlobEndpoint, SendError};
pub use fragment::{
    AssemblerConfig,
    Blob,
    BlobAssembler,
    BlobId,
    FRAGMENT_HEADER_LEN,
    FragmentBatch,
    FragmentFrame,
    FragmentHeader,
    FragmentStatus,
    FragmentationError,
    Fragmenter,
    MAX_FRAGMENT_PAYLOAD,
    MalformedFragment,
    QueueId,
    SharedBlobAssembler,
    StaleBlobEvicted,
    encode_fragment,
    parse_datagram,
};
pub use metrics::{
    BLOBS_COMPLETED,
    CAPACITY_EVICTIONS,
    DATAGRAMS_TOTAL,
    Direction,
    FRAGMENTS_DROPPED,
    STALE_BLOBS_EVICTED,
};
