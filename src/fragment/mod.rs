//! Fragment wire types and the blob reassembly engine.
//!
//! This module collects the domain types used by the fragmentation and
//! reassembly layer: the 16-byte [`FragmentHeader`], the outbound
//! [`Fragmenter`], and the inbound [`BlobAssembler`]. Each sub-module focuses
//! on a single concept; none of them performs I/O.

pub mod assembler;
pub mod blob;
pub mod config;
pub mod error;
pub mod fragmenter;
pub mod header;
pub mod id;
pub mod packet;
mod partial;
pub mod shared;

pub use assembler::{BlobAssembler, StaleBlobEvicted};
pub use blob::Blob;
pub use config::{AssemblerConfig, DEFAULT_DUPLICATE_WINDOW, DEFAULT_STALE_AFTER};
pub use error::{FragmentStatus, FragmentationError, MalformedFragment};
pub use fragmenter::{FragmentBatch, FragmentFrame, Fragmenter};
pub use header::{FRAGMENT_HEADER_LEN, FragmentHeader};
pub use id::{BlobId, QueueId};
pub use packet::{encode_fragment, parse_datagram};
pub use shared::SharedBlobAssembler;

/// Largest payload one fragment can carry inside a single datagram.
pub const MAX_FRAGMENT_PAYLOAD: usize = crate::channel::DATAGRAM_CAPACITY - FRAGMENT_HEADER_LEN;
