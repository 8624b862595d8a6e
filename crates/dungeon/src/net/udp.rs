use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use super::stats::NetworkStats;
use super::transport::{Transport, TransportEvent};

/// An INIT for the default 50x50 map is well above a typical MTU, so datagrams rely on
/// IP fragmentation. Loopback and LAN play handle this fine.
pub const MAX_DATAGRAM_SIZE: usize = 16 * 1024;

const FRAME_MAGIC: [u8; 4] = *b"DNGN";
const FRAME_HEADER_LEN: usize = FRAME_MAGIC.len() + 1;

const FRAME_HELLO: u8 = 1;
const FRAME_HELLO_ACK: u8 = 2;
const FRAME_DATA: u8 = 3;
const FRAME_BYE: u8 = 4;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const HELLO_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Accepts the first peer that says hello. The host is the simulation authority.
    Host,
    Join,
}

/// Datagram transport with a hello/ack exchange standing in for connection setup.
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: Option<SocketAddr>,
    role: Role,
    state: LinkState,
    stats: NetworkStats,
    recv_buffer: Vec<u8>,
    timeout: Duration,
    last_receive_time: Instant,
    last_hello_time: Option<Instant>,
}

impl UdpTransport {
    pub fn host<A: ToSocketAddrs>(bind: A) -> io::Result<Self> {
        Self::bind(bind, Role::Host, None)
    }

    pub fn join<A: ToSocketAddrs>(bind: A, remote: SocketAddr) -> io::Result<Self> {
        Self::bind(bind, Role::Join, Some(remote))
    }

    fn bind<A: ToSocketAddrs>(
        addr: A,
        role: Role,
        remote_addr: Option<SocketAddr>,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            remote_addr,
            role,
            state: LinkState::Connecting,
            stats: NetworkStats::default(),
            recv_buffer: vec![0u8; MAX_DATAGRAM_SIZE],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            last_receive_time: Instant::now(),
            last_hello_time: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Says goodbye so the peer sees `Close` immediately instead of after the timeout.
    pub fn close(&mut self) {
        if self.state == LinkState::Open {
            self.send_frame(FRAME_BYE, &[]);
        }
        self.state = LinkState::Closed;
    }

    fn send_frame(&mut self, tag: u8, payload: &[u8]) {
        let Some(addr) = self.remote_addr else {
            return;
        };

        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        frame.extend_from_slice(&FRAME_MAGIC);
        frame.push(tag);
        frame.extend_from_slice(payload);

        if frame.len() > MAX_DATAGRAM_SIZE {
            log::warn!("Dropping {} byte frame, exceeds datagram limit", frame.len());
            self.stats.packets_dropped += 1;
            return;
        }

        match self.socket.send_to(&frame, addr) {
            Ok(bytes) => self.stats.record_sent(bytes),
            Err(e) => {
                log::debug!("Send to {} failed: {}", addr, e);
                self.stats.packets_dropped += 1;
            }
        }
    }

    fn maybe_send_hello(&mut self) {
        if self.role != Role::Join || self.state != LinkState::Connecting {
            return;
        }
        let due = self
            .last_hello_time
            .is_none_or(|sent| sent.elapsed() >= HELLO_INTERVAL);
        if due {
            self.send_frame(FRAME_HELLO, &[]);
            self.last_hello_time = Some(Instant::now());
        }
    }

    fn handle_frame(&mut self, size: usize, from: SocketAddr, events: &mut Vec<TransportEvent>) {
        if size < FRAME_HEADER_LEN || self.recv_buffer[..FRAME_MAGIC.len()] != FRAME_MAGIC {
            return;
        }
        if self.remote_addr.is_some_and(|remote| remote != from) {
            log::debug!("Ignoring datagram from unknown peer {}", from);
            return;
        }

        let tag = self.recv_buffer[FRAME_MAGIC.len()];
        match (self.role, self.state, tag) {
            (Role::Host, LinkState::Connecting, FRAME_HELLO) => {
                log::info!("Peer {} connected", from);
                self.remote_addr = Some(from);
                self.state = LinkState::Open;
                self.send_frame(FRAME_HELLO_ACK, &[]);
                events.push(TransportEvent::Open);
            }
            (Role::Host, LinkState::Open, FRAME_HELLO) => {
                // Our ack was lost.
                self.send_frame(FRAME_HELLO_ACK, &[]);
            }
            (Role::Join, LinkState::Connecting, FRAME_HELLO_ACK) => {
                log::info!("Connected to {}", from);
                self.state = LinkState::Open;
                events.push(TransportEvent::Open);
            }
            (_, LinkState::Open, FRAME_DATA) => {
                self.stats.record_received(size);
                let payload = self.recv_buffer[FRAME_HEADER_LEN..size].to_vec();
                events.push(TransportEvent::Message(payload));
            }
            (_, LinkState::Open, FRAME_BYE) => {
                log::info!("Peer {} said goodbye", from);
                self.state = LinkState::Closed;
                events.push(TransportEvent::Close);
            }
            _ => return,
        }

        self.last_receive_time = Instant::now();
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, data: &[u8]) {
        if self.state != LinkState::Open {
            return;
        }
        self.send_frame(FRAME_DATA, data);
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if self.state == LinkState::Closed {
            return events;
        }

        self.maybe_send_hello();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => {
                    self.handle_frame(size, addr, &mut events);
                    if self.state == LinkState::Closed {
                        return events;
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::debug!("Receive failed: {}", e);
                    break;
                }
            }
        }

        if self.state == LinkState::Open && self.last_receive_time.elapsed() > self.timeout {
            log::warn!("Peer timed out after {:?}", self.timeout);
            self.state = LinkState::Closed;
            events.push(TransportEvent::Close);
        }

        events
    }

    fn is_open(&self) -> bool {
        self.state == LinkState::Open
    }

    fn stats(&self) -> NetworkStats {
        self.stats
    }
}
