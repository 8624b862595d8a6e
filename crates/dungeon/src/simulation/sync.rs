use std::collections::HashSet;

use glam::IVec2;

use crate::entity::{Enemy, Item};
use crate::event::SessionEvent;
use crate::map::{Grid, GridError};
use crate::net::{EnemyState, GridState, InitMessage, SyncMessage};
use crate::render::AttackEffect;

use super::movement::Strike;
use super::session::{EndCause, Session, SessionPhase, World};

impl Session {
    /// The authority's current world, ready to send. `None` before the world exists.
    pub fn init_message(&self) -> Option<InitMessage> {
        if !self.authority {
            return None;
        }
        let world = self.world.as_ref()?;
        Some(InitMessage {
            grid: GridState::from_grid(&world.grid),
            enemies: world.enemies.iter().map(Enemy::to_network_state).collect(),
            items: world.items.iter().map(Item::to_network_state).collect(),
            spawn: self.spawn.to_array(),
        })
    }

    /// This tick's SYNC. The authority also ships enemies and its contact damage total.
    pub fn sync_message(&self, strike: Option<Strike>) -> SyncMessage {
        let body = &self.local.body;
        let enemies = if self.authority {
            self.world
                .as_ref()
                .map(|w| w.enemies.iter().map(Enemy::to_network_state).collect())
        } else {
            None
        };
        let peer_damage_total = (self.authority && self.peer_damage_dealt > 0)
            .then_some(self.peer_damage_dealt);

        SyncMessage {
            x: body.position.x,
            y: body.position.y,
            hp: body.hp,
            class: self.local.class,
            attack: strike.map(|s| s.target.to_array()),
            enemies,
            peer_damage_total,
        }
    }

    /// Handles an inbound INIT according to role and phase. A bad grid ends the session.
    pub fn receive_init(&mut self, init: InitMessage) {
        if self.authority {
            log::warn!("Ignoring INIT: this peer is the authority");
            return;
        }
        if self.phase != SessionPhase::InitPending {
            log::debug!("Ignoring INIT in phase {}", self.phase.name());
            return;
        }

        match self.apply_init(&init) {
            Ok(()) => self.set_phase(SessionPhase::Running),
            Err(e) => {
                log::error!("Rejecting INIT: {}", e);
                self.events.push(SessionEvent::InitRejected(e.clone()));
                self.set_phase(SessionPhase::Ended(EndCause::MalformedInit(e)));
            }
        }
    }

    /// Replaces grid, enemies and items with the INIT contents and moves both players to
    /// its spawn. Nothing changes if the grid does not decode.
    pub fn apply_init(&mut self, init: &InitMessage) -> Result<(), GridError> {
        let grid = init
            .grid
            .to_grid(self.config.grid_width, self.config.grid_height)?;
        let enemies = init
            .enemies
            .iter()
            .map(|state| Enemy::from_network_state(state, &self.config))
            .collect();
        let items: Vec<Item> = init.items.iter().filter_map(Item::from_network_state).collect();
        if items.len() != init.items.len() {
            log::warn!("Dropped {} items of unknown kind", init.items.len() - items.len());
        }

        let spawn = resolve_spawn(&grid, IVec2::from(init.spawn));
        log::debug!(
            "Applied INIT: {} enemies, {} items, spawn at {}",
            init.enemies.len(),
            items.len(),
            spawn
        );

        self.place_players(spawn);
        self.world = Some(World {
            grid,
            enemies,
            items,
        });
        Ok(())
    }

    /// Last write wins for the remote player. Enemies are only taken from the authority.
    pub fn apply_sync(&mut self, sync: SyncMessage) {
        self.remote.set_class(sync.class, &self.config);
        self.remote.body.position = IVec2::new(sync.x, sync.y);
        self.remote.body.set_hp(sync.hp);

        if let Some([x, y]) = sync.attack {
            self.effects.push(AttackEffect::new(
                IVec2::new(x, y),
                self.config.attack_effect_ticks,
            ));
        }

        if self.authority {
            self.peer_synced = true;
            if sync.enemies.is_some() || sync.peer_damage_total.is_some() {
                log::warn!("Ignoring authority-only SYNC fields from the non-authority peer");
            }
            return;
        }

        if let Some(states) = sync.enemies {
            self.replace_enemies(&states);
        }
        if let Some(total) = sync.peer_damage_total {
            self.apply_peer_damage(total);
        }
    }

    /// Applies only the part of `total` not yet seen. Older or repeated totals are no-ops.
    fn apply_peer_damage(&mut self, total: i32) {
        let owed = total - self.peer_damage_applied;
        if owed <= 0 {
            return;
        }
        self.peer_damage_applied = total;
        let dealt = self.local.body.apply_damage(owed);
        log::debug!("Took {} contact damage on the authority", dealt);
    }

    fn replace_enemies(&mut self, states: &[EnemyState]) {
        let Some(world) = self.world.as_mut() else {
            log::debug!("Dropping SYNC enemies received before INIT");
            return;
        };

        let alive: HashSet<u32> = states.iter().map(|s| s.id).collect();
        for gone in world.enemies.iter().filter(|e| !alive.contains(&e.id)) {
            self.events.push(SessionEvent::EnemyKilled {
                id: gone.id,
                boss: gone.kind.is_boss(),
            });
        }

        world.enemies = states
            .iter()
            .map(|state| Enemy::from_network_state(state, &self.config))
            .collect();
    }
}

/// The sent spawn if it is walkable, else the first walkable cell in row-major order.
fn resolve_spawn(grid: &Grid, spawn: IVec2) -> IVec2 {
    if grid.is_passable(spawn) {
        return spawn;
    }
    let width = grid.width() as i32;
    let fallback = (0..grid.height() as i32)
        .flat_map(|y| (0..width).map(move |x| IVec2::new(x, y)))
        .find(|&pos| grid.is_passable(pos));
    match fallback {
        Some(pos) => {
            log::warn!("INIT spawn {} is not walkable, using {}", spawn, pos);
            pos
        }
        None => spawn,
    }
}
