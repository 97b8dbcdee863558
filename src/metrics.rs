//! Metric helpers for `blobwire`.
//!
//! This module defines metric names and small helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking datagrams moved through a channel.
pub const DATAGRAMS_TOTAL: &str = "blobwire_datagrams_total";
/// Name of the counter tracking fragments that were dropped.
pub const FRAGMENTS_DROPPED: &str = "blobwire_fragments_dropped_total";
/// Name of the counter tracking blobs that finished reassembly.
pub const BLOBS_COMPLETED: &str = "blobwire_blobs_completed_total";
/// Name of the counter tracking partial blobs evicted for inactivity.
pub const STALE_BLOBS_EVICTED: &str = "blobwire_stale_blobs_evicted_total";
/// Name of the counter tracking partial blobs evicted to stay under the
/// partial blob limit.
pub const CAPACITY_EVICTIONS: &str = "blobwire_capacity_evictions_total";

/// Direction of datagram processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Datagrams received from a peer.
    Inbound,
    /// Datagrams sent to a peer.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a datagram for the given direction.
pub fn inc_datagrams(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(DATAGRAMS_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a dropped fragment, labelled with why it was dropped.
pub fn inc_fragments_dropped(reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_DROPPED, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}

/// Record a completed blob.
pub fn inc_blobs_completed() {
    #[cfg(feature = "metrics")]
    counter!(BLOBS_COMPLETED).increment(1);
}

/// Record partial blobs evicted for inactivity.
pub fn add_stale_evictions(count: usize) {
    #[cfg(feature = "metrics")]
    counter!(STALE_BLOBS_EVICTED).increment(u64::try_from(count).unwrap_or(u64::MAX));
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record a partial blob evicted because the partial blob limit was reached.
pub fn inc_capacity_evictions() {
    #[cfg(feature = "metrics")]
    counter!(CAPACITY_EVICTIONS).increment(1);
}
