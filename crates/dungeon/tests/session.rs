use dungeon::net::{GridState, InitMessage, NetworkMessage, encode_message};
use dungeon::{
    EndCause, GameConfig, GridError, InputState, LoopbackTransport, PacketLossSimulation,
    PlayerClass, RenderFrame, Session, SessionLoop, SessionPhase, Transport,
};

type Peer = SessionLoop<LoopbackTransport>;

fn peers(seed: u64) -> (Peer, Peer) {
    let config = GameConfig {
        seed: Some(seed),
        ..Default::default()
    };
    let (a, b) = LoopbackTransport::pair();
    let host = Session::new(config.clone(), true, PlayerClass::Warrior).unwrap();
    let guest = Session::new(config, false, PlayerClass::Mage).unwrap();
    (SessionLoop::new(host, a), SessionLoop::new(guest, b))
}

fn tick(peer: &mut Peer, input: InputState) {
    peer.tick(input, &mut |_: &RenderFrame<'_>| {});
}

fn round(host: &mut Peer, guest: &mut Peer, guest_input: InputState) {
    tick(host, InputState::empty());
    tick(guest, guest_input);
}

fn enemy_snapshot(peer: &Peer) -> Vec<(u32, i32, i32, i32)> {
    peer.session()
        .world()
        .map(|w| {
            w.enemies
                .iter()
                .map(|e| (e.id, e.body.position.x, e.body.position.y, e.body.hp))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn peers_share_one_world() {
    let (mut host, mut guest) = peers(1);
    round(&mut host, &mut guest, InputState::empty());

    assert_eq!(host.session().phase(), &SessionPhase::Running);
    assert_eq!(guest.session().phase(), &SessionPhase::Running);
    let host_world = host.session().world().unwrap();
    let guest_world = guest.session().world().unwrap();
    assert_eq!(host_world.grid, guest_world.grid);
    assert_eq!(host_world.items, guest_world.items);
    assert_eq!(enemy_snapshot(&host), enemy_snapshot(&guest));
    assert_eq!(
        guest.session().local_player().position(),
        host.session().spawn()
    );
}

#[test]
fn guest_movement_reaches_host() {
    let (mut host, mut guest) = peers(2);
    for _ in 0..40 {
        round(&mut host, &mut guest, InputState::RIGHT);
    }
    round(&mut host, &mut guest, InputState::empty());
    tick(&mut host, InputState::empty());

    let guest_player = guest.session().local_player();
    let seen_by_host = host.session().remote_player();
    assert_eq!(seen_by_host.position(), guest_player.position());
    assert_eq!(seen_by_host.class, PlayerClass::Mage);
    assert_eq!(seen_by_host.body.max_hp, 80);
}

#[test]
fn lossy_link_heals_once_loss_stops() {
    let (mut host, mut guest) = peers(3);
    host.transport_mut()
        .set_packet_loss(PacketLossSimulation::new(0.5));
    guest
        .transport_mut()
        .set_packet_loss(PacketLossSimulation::new(0.5));

    for _ in 0..120 {
        round(&mut host, &mut guest, InputState::empty());
    }

    host.transport_mut()
        .set_packet_loss(PacketLossSimulation::default());
    guest
        .transport_mut()
        .set_packet_loss(PacketLossSimulation::default());
    for _ in 0..40 {
        round(&mut host, &mut guest, InputState::empty());
    }

    assert!(guest.session().world().is_some());
    assert!(host.session().peer_synced());
    assert_eq!(enemy_snapshot(&guest), enemy_snapshot(&host));
    assert!(host.transport().stats().packets_dropped > 0);
}

#[test]
fn corrupt_init_ends_the_guest_session() {
    let config = GameConfig::default();
    let (mut raw, link) = LoopbackTransport::pair();
    let session = Session::new(config, false, PlayerClass::Warrior).unwrap();
    let mut guest = SessionLoop::new(session, link);

    let init = InitMessage {
        grid: GridState {
            width: 50,
            height: 50,
            rows: vec![vec![b'.'; 50]; 49],
        },
        enemies: Vec::new(),
        items: Vec::new(),
        spawn: [1, 1],
    };
    raw.send(&encode_message(NetworkMessage::Init(init)).unwrap());
    tick(&mut guest, InputState::empty());

    assert_eq!(
        guest.session().phase(),
        &SessionPhase::Ended(EndCause::MalformedInit(GridError::RowCount {
            expected: 50,
            actual: 49
        }))
    );

    // Still alive as a process, just not simulating.
    tick(&mut guest, InputState::RIGHT);
    assert!(guest.session().world().is_none());
}

#[test]
fn garbage_datagrams_are_ignored() {
    let (mut raw, link) = LoopbackTransport::pair();
    let session = Session::new(GameConfig::default(), false, PlayerClass::Warrior).unwrap();
    let mut guest = SessionLoop::new(session, link);

    raw.send(b"not a packet");
    tick(&mut guest, InputState::empty());

    assert_eq!(guest.session().phase(), &SessionPhase::InitPending);
    assert_eq!(guest.inbox().rejected(), 1);
}
