use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use dungeon::{
    GameConfig, InputState, LinkState, PlayerClass, RenderFrame, Session, SessionLoop,
    SessionPhase, Transport, TransportEvent, UdpTransport,
};

static PORT_COUNTER: AtomicU16 = AtomicU16::new(41000);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(10, Ordering::SeqCst)
}

fn addr(port: u16) -> SocketAddr {
    format!("127.0.0.1:{}", port).parse().unwrap()
}

fn connected_pair() -> (UdpTransport, UdpTransport) {
    let port = next_port();
    let host = UdpTransport::host(addr(port)).unwrap();
    let join = UdpTransport::join(addr(port + 1), addr(port)).unwrap();
    (host, join)
}

fn poll_until<F>(transport: &mut UdpTransport, timeout_ms: u64, mut pred: F) -> bool
where
    F: FnMut(&TransportEvent) -> bool,
{
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        if transport.poll().iter().any(&mut pred) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn handshake(host: &mut UdpTransport, join: &mut UdpTransport) {
    let start = Instant::now();
    let (mut host_open, mut join_open) = (false, false);
    while !(host_open && join_open) && start.elapsed() < Duration::from_secs(2) {
        host_open |= host.poll().contains(&TransportEvent::Open);
        join_open |= join.poll().contains(&TransportEvent::Open);
        thread::sleep(Duration::from_millis(1));
    }
    assert!(host_open && join_open, "handshake did not complete");
}

#[test]
fn test_hello_handshake_opens_both_ends() {
    let (mut host, mut join) = connected_pair();
    assert_eq!(host.state(), LinkState::Connecting);
    assert!(host.is_host() && !join.is_host());

    handshake(&mut host, &mut join);

    assert!(host.is_open() && join.is_open());
    assert_eq!(host.remote_addr(), Some(join.local_addr()));
}

#[test]
fn test_data_flows_both_ways() {
    let (mut host, mut join) = connected_pair();
    handshake(&mut host, &mut join);

    join.send(b"ping");
    assert!(poll_until(&mut host, 500, |e| *e
        == TransportEvent::Message(b"ping".to_vec())));

    host.send(b"pong");
    assert!(poll_until(&mut join, 500, |e| *e
        == TransportEvent::Message(b"pong".to_vec())));

    assert_eq!(host.stats().packets_received, 1);
    assert_eq!(join.stats().packets_received, 1);
}

#[test]
fn test_send_before_open_is_dropped() {
    let (mut host, _join) = connected_pair();
    host.send(b"too early");
    assert_eq!(host.stats().packets_sent, 0);
}

#[test]
fn test_bye_closes_peer() {
    let (mut host, mut join) = connected_pair();
    handshake(&mut host, &mut join);

    join.close();

    assert_eq!(join.state(), LinkState::Closed);
    assert!(poll_until(&mut host, 500, |e| *e == TransportEvent::Close));
    assert!(!host.is_open());
}

#[test]
fn test_silence_times_out() {
    let (mut host, mut join) = connected_pair();
    handshake(&mut host, &mut join);
    host.set_timeout(Duration::from_millis(50));

    drop(join);

    assert!(poll_until(&mut host, 1000, |e| *e == TransportEvent::Close));
}

#[test]
fn test_sessions_start_over_udp() {
    let (host_link, join_link) = connected_pair();
    let config = GameConfig {
        seed: Some(17),
        ..Default::default()
    };
    let mut host = SessionLoop::new(
        Session::new(config.clone(), true, PlayerClass::Warrior).unwrap(),
        host_link,
    );
    let mut guest = SessionLoop::new(
        Session::new(config, false, PlayerClass::Mage).unwrap(),
        join_link,
    );

    let start = Instant::now();
    while guest.session().phase() != &SessionPhase::Running
        && start.elapsed() < Duration::from_secs(3)
    {
        host.tick(InputState::empty(), &mut |_: &RenderFrame<'_>| {});
        guest.tick(InputState::empty(), &mut |_: &RenderFrame<'_>| {});
        thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(guest.session().phase(), &SessionPhase::Running);
    assert_eq!(
        guest.session().world().map(|w| &w.grid),
        host.session().world().map(|w| &w.grid)
    );
}
