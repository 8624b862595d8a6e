use crate::event::SessionEvent;
use crate::net::{Inbox, NetworkMessage, Transport, encode_message};
use crate::render::Renderer;

use super::input::InputState;
use super::session::Session;

/// Drives a [`Session`] over a [`Transport`], one call to [`SessionLoop::tick`] per tick.
///
/// Transport events are buffered in an [`Inbox`] and applied at a single point late in
/// the tick, after this peer's own SYNC has gone out.
pub struct SessionLoop<T: Transport> {
    session: Session,
    transport: T,
    inbox: Inbox,
    ticks_since_init: u32,
}

impl<T: Transport> SessionLoop<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self {
            session,
            transport,
            inbox: Inbox::new(),
            ticks_since_init: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.session.drain_events()
    }

    pub fn tick<R: Renderer + ?Sized>(&mut self, input: InputState, renderer: &mut R) {
        for event in self.transport.poll() {
            self.inbox.push(event);
        }
        let inbound = self.inbox.drain();

        if inbound.opened {
            self.session.on_open();
            if let Some(init) = self.session.init_message() {
                self.send(NetworkMessage::Init(init));
                self.ticks_since_init = 0;
            }
        }

        if self.session.is_simulating() {
            self.session.age_effects();
            let strike = self.session.step_local(input);
            self.session.step_enemies();

            if self.session.sends_sync() {
                let sync = self.session.sync_message(strike);
                self.send(NetworkMessage::Sync(sync));
                self.resend_init_if_due();
            }
        }

        if let Some(init) = inbound.init {
            self.session.receive_init(init);
        }
        if let Some(sync) = inbound.sync {
            self.session.apply_sync(sync);
        }
        if inbound.closed {
            self.session.on_close();
        }

        self.session.finish_tick();
        renderer.draw(&self.session.frame());
    }

    fn resend_init_if_due(&mut self) {
        if !self.session.is_authority() || self.session.peer_synced() {
            return;
        }
        self.ticks_since_init += 1;
        if self.ticks_since_init < self.session.config().init_resend_interval {
            return;
        }
        self.ticks_since_init = 0;
        if let Some(init) = self.session.init_message() {
            log::debug!("Peer has not synced yet, resending INIT");
            self.send(NetworkMessage::Init(init));
        }
    }

    fn send(&mut self, message: NetworkMessage) {
        let kind = message.kind();
        match encode_message(message) {
            Ok(bytes) => {
                log::trace!("Sending {} ({} bytes)", kind, bytes.len());
                self.transport.send(&bytes);
            }
            Err(e) => log::error!("Failed to encode {}: {}", kind, e),
        }
    }
}
