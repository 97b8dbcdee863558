//! Loopback tests for `DatagramChannel`.

use std::{
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    time::{Duration, Instant},
};

use blobwire::channel::{
    ChannelConfig,
    DATAGRAM_CAPACITY,
    Datagram,
    DatagramChannel,
    DatagramError,
};
use rstest::{fixture, rstest};

const WAIT: Duration = Duration::from_secs(2);

fn loopback() -> SocketAddr { SocketAddr::from((Ipv4Addr::LOCALHOST, 0)) }

#[fixture]
fn channel() -> DatagramChannel {
    DatagramChannel::bind(&ChannelConfig::new(loopback())).expect("bind loopback channel")
}

/// Wait for and read the next datagram, failing after `WAIT`.
fn next_datagram(channel: &mut DatagramChannel) -> Option<Datagram> {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if !channel.wait_readable(Duration::from_millis(100)).expect("poll") {
            continue;
        }
        if let Some(datagram) = channel.receive().expect("receive") {
            return Some(datagram);
        }
    }
    None
}

#[rstest]
fn bound_channel_reports_assigned_port(channel: DatagramChannel) {
    let addr = channel.local_addr();
    assert_eq!(addr.ip(), Ipv4Addr::LOCALHOST);
    assert_ne!(addr.port(), 0);
}

#[rstest]
fn zero_timeout_wait_returns_immediately_when_idle(mut channel: DatagramChannel) {
    let start = Instant::now();
    assert!(!channel.wait_readable(Duration::ZERO).expect("poll"));
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(channel.receive().expect("receive").is_none());
}

#[rstest]
fn datagrams_cross_loopback(mut channel: DatagramChannel) {
    let sender = DatagramChannel::bind(&ChannelConfig::new(loopback())).expect("bind sender");
    let datagram = Datagram::new(channel.local_addr(), &b"ping"[..]).expect("small datagram");
    sender.send(&datagram).expect("send");

    let received = next_datagram(&mut channel).expect("datagram arrives");
    assert_eq!(received.payload(), b"ping");
    assert_eq!(received.peer(), sender.local_addr());
}

#[rstest]
fn queued_datagrams_drain_until_would_block(mut channel: DatagramChannel) {
    let sender = UdpSocket::bind(loopback()).expect("bind sender");
    for byte in 0_u8..3 {
        sender
            .send_to(&[byte], channel.local_addr())
            .expect("send");
    }

    let mut payloads = Vec::new();
    while let Some(datagram) = next_datagram(&mut channel) {
        payloads.push(datagram.payload()[0]);
        if payloads.len() == 3 {
            break;
        }
    }
    assert_eq!(payloads, [0, 1, 2]);
    assert!(channel.receive().expect("receive").is_none());
}

#[rstest]
fn oversized_datagram_is_dropped(mut channel: DatagramChannel) {
    let sender = UdpSocket::bind(loopback()).expect("bind sender");
    sender
        .send_to(&[0xEE; DATAGRAM_CAPACITY + 88], channel.local_addr())
        .expect("send oversized");
    sender
        .send_to(b"fits", channel.local_addr())
        .expect("send small");

    let received = next_datagram(&mut channel).expect("small datagram arrives");
    assert_eq!(received.payload(), b"fits");
}

#[rstest]
fn single_receive_skips_oversized_datagram(mut channel: DatagramChannel) {
    let sender = UdpSocket::bind(loopback()).expect("bind sender");
    sender
        .send_to(&[0xEE; DATAGRAM_CAPACITY + 1], channel.local_addr())
        .expect("send oversized");
    sender
        .send_to(b"next", channel.local_addr())
        .expect("send small");

    assert!(channel.wait_readable(WAIT).expect("poll"));
    let received = channel
        .receive()
        .expect("receive")
        .expect("datagram behind the oversized one");
    assert_eq!(received.payload(), b"next");
}

#[rstest]
fn datagram_at_capacity_is_delivered(mut channel: DatagramChannel) {
    let sender = UdpSocket::bind(loopback()).expect("bind sender");
    sender
        .send_to(&[0x5A; DATAGRAM_CAPACITY], channel.local_addr())
        .expect("send");

    let received = next_datagram(&mut channel).expect("datagram arrives");
    assert_eq!(received.payload().len(), DATAGRAM_CAPACITY);
}

#[test]
fn datagram_rejects_payload_above_capacity() {
    let err = Datagram::new(loopback(), vec![0_u8; DATAGRAM_CAPACITY + 1])
        .expect_err("payload too large");
    assert_eq!(
        err,
        DatagramError::TooLarge {
            len: DATAGRAM_CAPACITY + 1,
            capacity: DATAGRAM_CAPACITY,
        }
    );
}

#[test]
fn socket_options_apply_at_bind() {
    let config = ChannelConfig::new(loopback())
        .recv_buffer_size(64 * 1024)
        .send_buffer_size(64 * 1024)
        .reuse_address(true);
    let channel = DatagramChannel::bind(&config).expect("bind with options");
    assert_ne!(channel.local_addr().port(), 0);
}

#[test]
fn binding_taken_address_fails() {
    let holder = UdpSocket::bind(loopback()).expect("bind holder");
    let taken = holder.local_addr().expect("holder address");

    let err = DatagramChannel::bind(&ChannelConfig::new(taken)).expect_err("address in use");
    assert!(err.to_string().contains(&taken.to_string()), "{err}");
}
