use crate::entity::ItemKind;
use crate::map::GridError;
use crate::simulation::SessionPhase;

/// Things the player-facing layer should hear about, drained once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    PeerLost { was_authority: bool },
    LocalPlayerDied,
    InitRejected(GridError),
    EnemyKilled { id: u32, boss: bool },
    ItemPickedUp { kind: ItemKind, healed: i32 },
}
