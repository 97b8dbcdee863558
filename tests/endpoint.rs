//! End-to-end tests driving `BlobEndpoint` over loopback.

use std::{
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use blobwire::{
    channel::ChannelConfig,
    endpoint::BlobEndpoint,
    fragment::{
        AssemblerConfig,
        Blob,
        BlobId,
        FragmentHeader,
        Fragmenter,
        MAX_FRAGMENT_PAYLOAD,
        QueueId,
        encode_fragment,
    },
};
use rstest::{fixture, rstest};

fn loopback() -> SocketAddr { SocketAddr::from((Ipv4Addr::LOCALHOST, 0)) }

#[fixture]
fn endpoint() -> BlobEndpoint {
    BlobEndpoint::bind(&ChannelConfig::new(loopback()), AssemblerConfig::default())
        .expect("bind endpoint")
}

/// Poll until at least `want` blobs are drained or two seconds pass.
fn collect_blobs(endpoint: &mut BlobEndpoint, want: usize) -> Vec<Blob> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut blobs = Vec::new();
    while blobs.len() < want && Instant::now() < deadline {
        endpoint.poll(Duration::from_millis(50)).expect("poll");
        blobs.extend(endpoint.drain_blobs());
    }
    blobs
}

#[rstest]
fn multi_fragment_blob_round_trips(mut endpoint: BlobEndpoint) {
    let sender = BlobEndpoint::bind(&ChannelConfig::new(loopback()), AssemblerConfig::default())
        .expect("bind sender")
        .with_fragmenter(Fragmenter::with_starting_id(
            NonZeroUsize::new(MAX_FRAGMENT_PAYLOAD).expect("non-zero"),
            BlobId::new(500),
        ));
    let payload: Vec<u8> = (0..=250_u8).cycle().take(2_000).collect();

    let id = sender
        .send_blob(endpoint.local_addr(), QueueId::new(2), &payload)
        .expect("send blob");
    assert_eq!(id, BlobId::new(500));

    let blobs = collect_blobs(&mut endpoint, 1);
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].id(), id);
    assert_eq!(blobs[0].queue_id(), QueueId::new(2));
    assert_eq!(blobs[0].payload(), payload.as_slice());
    assert_eq!(endpoint.assembler().partial_len(), 0);
}

#[rstest]
fn reordered_fragments_reassemble(mut endpoint: BlobEndpoint) {
    let raw = UdpSocket::bind(loopback()).expect("bind raw sender");
    let id = BlobId::new(7);
    let queue = QueueId::new(1);
    for (index, part) in [(2_u16, &b"GH"[..]), (0, &b"ABCD"[..]), (1, &b"EF"[..])] {
        let size = u16::try_from(part.len()).expect("small part");
        let header = FragmentHeader::new(id, 3, size, index, queue);
        raw.send_to(&encode_fragment(&header, part), endpoint.local_addr())
            .expect("send fragment");
    }

    let blobs = collect_blobs(&mut endpoint, 1);
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].payload(), b"ABCDEFGH");
}

#[rstest]
fn malformed_datagrams_are_absorbed(mut endpoint: BlobEndpoint) {
    let raw = UdpSocket::bind(loopback()).expect("bind raw sender");
    raw.send_to(&[1, 2, 3], endpoint.local_addr())
        .expect("send truncated");
    let zero_count = FragmentHeader::new(BlobId::new(1), 0, 0, 0, QueueId::new(0));
    raw.send_to(&encode_fragment(&zero_count, b""), endpoint.local_addr())
        .expect("send zero count");
    let good = FragmentHeader::new(BlobId::new(9), 1, 3, 0, QueueId::new(1));
    raw.send_to(&encode_fragment(&good, b"XYZ"), endpoint.local_addr())
        .expect("send good");

    let blobs = collect_blobs(&mut endpoint, 1);
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].id(), BlobId::new(9));
    assert_eq!(blobs[0].payload(), b"XYZ");
}

#[test]
fn receive_budget_caps_reads_per_poll() {
    let mut endpoint =
        BlobEndpoint::bind(&ChannelConfig::new(loopback()), AssemblerConfig::default())
            .expect("bind endpoint")
            .with_receive_budget(NonZeroUsize::new(1).expect("non-zero"));
    let raw = UdpSocket::bind(loopback()).expect("bind raw sender");
    for id in 0..3 {
        let header = FragmentHeader::new(BlobId::new(id), 1, 1, 0, QueueId::new(0));
        raw.send_to(&encode_fragment(&header, b"x"), endpoint.local_addr())
            .expect("send");
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut blobs = Vec::new();
    while blobs.len() < 3 && Instant::now() < deadline {
        let read = endpoint.poll(Duration::from_millis(50)).expect("poll");
        assert!(read <= 1);
        blobs.extend(endpoint.drain_blobs());
    }
    assert_eq!(blobs.len(), 3);
}

#[rstest]
fn idle_poll_respects_timeout(mut endpoint: BlobEndpoint) {
    let start = Instant::now();
    assert_eq!(endpoint.poll(Duration::ZERO).expect("poll"), 0);
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(endpoint.drain_blobs().is_empty());
}

#[test]
fn idle_poll_sweeps_stale_partials() {
    let config = AssemblerConfig::default().with_stale_after(Duration::from_millis(50));
    let mut endpoint = BlobEndpoint::bind(&ChannelConfig::new(loopback()), config)
        .expect("bind endpoint");
    let raw = UdpSocket::bind(loopback()).expect("bind raw sender");
    let header = FragmentHeader::new(BlobId::new(3), 2, 1, 0, QueueId::new(0));
    raw.send_to(&encode_fragment(&header, b"a"), endpoint.local_addr())
        .expect("send");

    let deadline = Instant::now() + Duration::from_secs(2);
    while endpoint.assembler().partial_len() == 0 && Instant::now() < deadline {
        endpoint.poll(Duration::from_millis(20)).expect("poll");
    }
    assert!(endpoint.assembler().contains_partial(BlobId::new(3)));

    std::thread::sleep(Duration::from_millis(100));
    endpoint.poll(Duration::ZERO).expect("poll");
    assert_eq!(endpoint.assembler().partial_len(), 0);
}

#[rstest]
fn oversized_datagram_does_not_end_poll_batch(mut endpoint: BlobEndpoint) {
    let raw = UdpSocket::bind(loopback()).expect("bind raw sender");
    raw.send_to(&[0xEE; 600], endpoint.local_addr())
        .expect("send oversized");
    let header = FragmentHeader::new(BlobId::new(31), 1, 2, 0, QueueId::new(0));
    raw.send_to(&encode_fragment(&header, b"ok"), endpoint.local_addr())
        .expect("send fragment");

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut read = 0;
    while read == 0 && Instant::now() < deadline {
        read = endpoint.poll(Duration::from_millis(50)).expect("poll");
    }

    assert_eq!(read, 1);
    let blobs = endpoint.drain_blobs();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].payload(), b"ok");
}
