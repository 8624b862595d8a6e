use super::protocol::{InitMessage, NetworkMessage, SyncMessage, decode_message};
use super::transport::TransportEvent;

/// Everything that arrived since the previous drain.
#[derive(Debug, Default)]
pub struct Inbound {
    pub opened: bool,
    pub closed: bool,
    pub init: Option<InitMessage>,
    pub sync: Option<SyncMessage>,
}

/// Holds transport events between ticks: one slot per message kind, newest wins.
#[derive(Debug, Default)]
pub struct Inbox {
    pending: Inbound,
    superseded: u64,
    rejected: u64,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => self.pending.opened = true,
            TransportEvent::Close => self.pending.closed = true,
            TransportEvent::Message(data) => match decode_message(&data) {
                Ok(message) => self.store(message),
                Err(e) => {
                    self.rejected += 1;
                    log::warn!("Ignoring undecodable {} byte message: {}", data.len(), e);
                }
            },
        }
    }

    fn store(&mut self, message: NetworkMessage) {
        let replaced = match message {
            NetworkMessage::Init(init) => self.pending.init.replace(init).is_some(),
            NetworkMessage::Sync(sync) => self.pending.sync.replace(sync).is_some(),
        };
        if replaced {
            self.superseded += 1;
        }
    }

    pub fn drain(&mut self) -> Inbound {
        std::mem::take(&mut self.pending)
    }

    /// Messages overwritten by a newer one of the same kind before they were applied.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn is_empty(&self) -> bool {
        let p = &self.pending;
        !p.opened && !p.closed && p.init.is_none() && p.sync.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PlayerClass;
    use crate::net::encode_message;

    fn sync_at(x: i32) -> TransportEvent {
        let message = NetworkMessage::Sync(SyncMessage {
            x,
            y: 0,
            hp: 100,
            class: PlayerClass::Warrior,
            attack: None,
            enemies: None,
            peer_damage_total: None,
        });
        TransportEvent::Message(encode_message(message).unwrap())
    }

    #[test]
    fn newest_sync_wins() {
        let mut inbox = Inbox::new();
        inbox.push(sync_at(1));
        inbox.push(sync_at(2));

        let inbound = inbox.drain();
        assert_eq!(inbound.sync.map(|s| s.x), Some(2));
        assert_eq!(inbox.superseded(), 1);
        assert!(inbox.is_empty());
    }

    #[test]
    fn garbage_is_counted_and_dropped() {
        let mut inbox = Inbox::new();
        inbox.push(TransportEvent::Message(vec![0xff; 3]));

        assert!(inbox.is_empty());
        assert_eq!(inbox.rejected(), 1);
    }

    #[test]
    fn open_and_close_are_latched() {
        let mut inbox = Inbox::new();
        inbox.push(TransportEvent::Open);
        inbox.push(TransportEvent::Close);

        let inbound = inbox.drain();
        assert!(inbound.opened && inbound.closed);
    }
}
