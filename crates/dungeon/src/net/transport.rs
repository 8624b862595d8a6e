use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::stats::{NetworkStats, PacketLossSimulation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(Vec<u8>),
    Close,
}

/// Best-effort, ordered, unacknowledged channel to the other peer.
///
/// Implementations never block. Events that arrive between ticks are queued and handed out
/// by `poll`; `send` on a transport that is not open is silently dropped.
pub trait Transport {
    fn send(&mut self, data: &[u8]);

    fn poll(&mut self) -> Vec<TransportEvent>;

    fn is_open(&self) -> bool;

    fn stats(&self) -> NetworkStats;
}

#[derive(Debug, Default)]
struct Link {
    queues: [VecDeque<TransportEvent>; 2],
    closed: bool,
}

/// In-process transport pair. Both ends report `Open` on their first poll.
#[derive(Debug)]
pub struct LoopbackTransport {
    link: Arc<Mutex<Link>>,
    side: usize,
    loss: PacketLossSimulation,
    stats: NetworkStats,
}

impl LoopbackTransport {
    pub fn pair() -> (Self, Self) {
        let mut link = Link::default();
        link.queues[0].push_back(TransportEvent::Open);
        link.queues[1].push_back(TransportEvent::Open);
        let link = Arc::new(Mutex::new(link));

        let a = Self {
            link: Arc::clone(&link),
            side: 0,
            loss: PacketLossSimulation::default(),
            stats: NetworkStats::default(),
        };
        let b = Self {
            link,
            side: 1,
            loss: PacketLossSimulation::default(),
            stats: NetworkStats::default(),
        };
        (a, b)
    }

    pub fn set_packet_loss(&mut self, loss: PacketLossSimulation) {
        self.loss = loss;
    }

    /// Tears the link down; both ends observe `Close` on their next poll.
    pub fn close(&mut self) {
        let mut link = self.lock();
        if link.closed {
            return;
        }
        link.closed = true;
        for queue in &mut link.queues {
            queue.push_back(TransportEvent::Close);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Link> {
        self.link.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, data: &[u8]) {
        if self.loss.should_drop() {
            self.stats.packets_dropped += 1;
            return;
        }

        let peer = 1 - self.side;
        let mut link = self.lock();
        if link.closed {
            return;
        }
        link.queues[peer].push_back(TransportEvent::Message(data.to_vec()));
        drop(link);

        self.stats.record_sent(data.len());
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let side = self.side;
        let events: Vec<TransportEvent> = self.lock().queues[side].drain(..).collect();
        for event in &events {
            if let TransportEvent::Message(data) = event {
                self.stats.record_received(data.len());
            }
        }
        events
    }

    fn is_open(&self) -> bool {
        !self.lock().closed
    }

    fn stats(&self) -> NetworkStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_opens_and_delivers_in_order() {
        let (mut a, mut b) = LoopbackTransport::pair();
        a.send(b"one");
        a.send(b"two");

        assert_eq!(
            b.poll(),
            vec![
                TransportEvent::Open,
                TransportEvent::Message(b"one".to_vec()),
                TransportEvent::Message(b"two".to_vec()),
            ]
        );
        assert_eq!(a.poll(), vec![TransportEvent::Open]);
        assert_eq!(b.stats().packets_received, 2);
    }

    #[test]
    fn send_after_close_is_dropped() {
        let (mut a, mut b) = LoopbackTransport::pair();
        b.poll();
        a.close();
        a.send(b"late");

        assert!(!b.is_open());
        assert_eq!(b.poll(), vec![TransportEvent::Close]);
        assert_eq!(a.stats().packets_sent, 0);
    }

    #[test]
    fn total_loss_drops_everything() {
        let (mut a, mut b) = LoopbackTransport::pair();
        a.set_packet_loss(PacketLossSimulation::new(1.0));
        a.send(b"lost");

        assert_eq!(b.poll(), vec![TransportEvent::Open]);
        assert_eq!(a.stats().packets_dropped, 1);
    }
}
