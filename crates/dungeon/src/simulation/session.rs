use glam::IVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{ConfigError, GameConfig};
use crate::entity::{Enemy, Item, Player, PlayerClass};
use crate::event::SessionEvent;
use crate::map::{Grid, GridError, MapGenerator};
use crate::render::{self, AttackEffect, RenderFrame, Sprite};

use super::ai::EnemyAi;
use super::combat;
use super::input::InputState;
use super::movement::{self, MoveOutcome, Strike};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndCause {
    LocalDeath,
    MalformedInit(GridError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport not open yet.
    Setup,
    /// Non-authority waiting for the world.
    InitPending,
    Running,
    Ended(EndCause),
    PeerLost { was_authority: bool },
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::InitPending => "init-pending",
            Self::Running => "running",
            Self::Ended(EndCause::LocalDeath) => "ended (died)",
            Self::Ended(EndCause::MalformedInit(_)) => "ended (bad init)",
            Self::PeerLost { .. } => "peer lost",
        }
    }
}

/// The shared dungeon. The grid never changes after creation; enemies and items do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub grid: Grid,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
}

/// Everything one peer knows about the game.
///
/// A session owns the world, both players and the transient render effects. The authority
/// generates the world and runs the enemy AI; the other peer receives the world once via
/// INIT and then mirrors enemies from every SYNC.
pub struct Session {
    pub(super) config: GameConfig,
    pub(super) authority: bool,
    pub(super) phase: SessionPhase,
    pub(super) world: Option<World>,
    pub(super) local: Player,
    pub(super) remote: Player,
    pub(super) spawn: IVec2,
    pub(super) effects: Vec<AttackEffect>,
    /// Authority: contact damage dealt so far to our copy of the remote player.
    pub(super) peer_damage_dealt: i32,
    /// Non-authority: the highest damage total already applied to the local player.
    pub(super) peer_damage_applied: i32,
    /// Authority only: the peer has answered with at least one SYNC.
    pub(super) peer_synced: bool,
    pub(super) events: Vec<SessionEvent>,
    rng: StdRng,
    tick: u32,
    death_reported: bool,
}

impl Session {
    pub fn new(config: GameConfig, authority: bool, class: PlayerClass) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let local = Player::new(class, IVec2::ZERO, &config);
        let remote = Player::new(PlayerClass::default(), IVec2::ZERO, &config);

        Ok(Self {
            config,
            authority,
            phase: SessionPhase::Setup,
            world: None,
            local,
            remote,
            spawn: IVec2::ZERO,
            effects: Vec::new(),
            peer_damage_dealt: 0,
            peer_damage_applied: 0,
            peer_synced: false,
            events: Vec::new(),
            rng,
            tick: 0,
            death_reported: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_authority(&self) -> bool {
        self.authority
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn local_player(&self) -> &Player {
        &self.local
    }

    pub fn remote_player(&self) -> &Player {
        &self.remote
    }

    pub fn spawn(&self) -> IVec2 {
        self.spawn
    }

    pub fn effects(&self) -> &[AttackEffect] {
        &self.effects
    }

    pub fn peer_synced(&self) -> bool {
        self.peer_synced
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        log::info!("Session phase {} -> {}", self.phase.name(), phase.name());
        self.phase = phase.clone();
        self.events.push(SessionEvent::PhaseChanged(phase));
    }

    /// Transport came up. The authority builds the world and goes straight to running.
    pub fn on_open(&mut self) {
        if self.phase != SessionPhase::Setup {
            log::debug!("Ignoring transport open in phase {}", self.phase.name());
            return;
        }
        self.set_phase(SessionPhase::InitPending);

        if self.authority {
            self.generate_world();
            self.set_phase(SessionPhase::Running);
        }
    }

    fn generate_world(&mut self) {
        let map = MapGenerator::new(&self.config).generate(&mut self.rng);
        let (enemies, items) = combat::spawn_entities(&map, &self.config, &mut self.rng);
        let spawn = map.spawn_point();

        log::info!(
            "Generated world: {} rooms, {} enemies, {} items, spawn at {}",
            map.rooms.len(),
            enemies.len(),
            items.len(),
            spawn
        );

        self.place_players(spawn);
        self.world = Some(World {
            grid: map.grid,
            enemies,
            items,
        });
    }

    pub(super) fn place_players(&mut self, spawn: IVec2) {
        self.spawn = spawn;
        self.local.body.position = spawn;
        self.remote.body.position = spawn;
    }

    /// Transport went away. Terminal, except that a session that already failed its INIT
    /// keeps that cause.
    pub fn on_close(&mut self) {
        match self.phase {
            SessionPhase::Setup => {
                log::warn!("Transport closed before it opened");
                return;
            }
            SessionPhase::PeerLost { .. } | SessionPhase::Ended(EndCause::MalformedInit(_)) => {
                return;
            }
            _ => {}
        }

        let was_authority = !self.authority;
        log::warn!(
            "Lost connection to {} peer",
            if was_authority { "authority" } else { "non-authority" }
        );
        self.set_phase(SessionPhase::PeerLost { was_authority });
        self.events.push(SessionEvent::PeerLost { was_authority });
    }

    /// A world exists and the session has not failed outright.
    pub fn is_simulating(&self) -> bool {
        self.world.is_some()
            && matches!(
                self.phase,
                SessionPhase::Running
                    | SessionPhase::Ended(EndCause::LocalDeath)
                    | SessionPhase::PeerLost { .. }
            )
    }

    pub fn sends_sync(&self) -> bool {
        self.world.is_some()
            && matches!(
                self.phase,
                SessionPhase::Running | SessionPhase::Ended(EndCause::LocalDeath)
            )
    }

    fn controls_local_player(&self) -> bool {
        self.local.is_alive()
            && matches!(
                self.phase,
                SessionPhase::Running | SessionPhase::PeerLost { .. }
            )
    }

    pub fn age_effects(&mut self) {
        self.effects.retain_mut(|effect| {
            effect.remaining = effect.remaining.saturating_sub(1);
            effect.remaining > 0
        });
    }

    /// Movement then attack for the local player. Returns the attacked cell, if any.
    pub fn step_local(&mut self, input: InputState) -> Option<Strike> {
        if !self.controls_local_player() {
            return None;
        }
        let world = self.world.as_mut()?;

        let outcome = movement::move_player(
            &mut self.local,
            input.direction(),
            &world.grid,
            &mut world.items,
            &self.config,
        );
        match outcome {
            MoveOutcome::Moved {
                to,
                hazard_damage,
                pickups,
            } => {
                if hazard_damage > 0 {
                    log::debug!("Hazard at {} dealt {}", to, hazard_damage);
                }
                for pickup in pickups {
                    self.events.push(SessionEvent::ItemPickedUp {
                        kind: pickup.kind,
                        healed: pickup.healed,
                    });
                }
            }
            MoveOutcome::Blocked => log::trace!("Bumped into a wall"),
            MoveOutcome::Cooldown | MoveOutcome::Idle => {}
        }

        let strike = movement::attack(&mut self.local, input.attack(), &mut world.enemies, &self.config)?;
        log::trace!("Attack at {} hit {} enemies", strike.target, strike.hits);
        self.effects
            .push(AttackEffect::new(strike.target, self.config.attack_effect_ticks));
        Some(strike)
    }

    /// Authority only: clear out the dead, then let the rest act.
    pub fn step_enemies(&mut self) {
        if !self.authority {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };

        for enemy in combat::prune_dead(&mut world.enemies) {
            log::debug!("Enemy {} died", enemy.id);
            self.events.push(SessionEvent::EnemyKilled {
                id: enemy.id,
                boss: enemy.kind.is_boss(),
            });
        }

        let remote = match self.phase {
            SessionPhase::PeerLost { .. } => None,
            _ => Some(&mut self.remote),
        };
        let report = EnemyAi::new(&self.config).update(
            &mut world.enemies,
            &world.grid,
            &mut self.local,
            remote,
            &mut self.rng,
        );
        self.peer_damage_dealt += report.damage_to_remote;
    }

    /// Closes out a tick: notices local death and advances the counter.
    pub fn finish_tick(&mut self) {
        if !self.death_reported && self.world.is_some() && !self.local.is_alive() {
            self.death_reported = true;
            log::info!("Local player died");
            self.events.push(SessionEvent::LocalPlayerDied);
            if self.phase == SessionPhase::Running {
                self.set_phase(SessionPhase::Ended(EndCause::LocalDeath));
            }
        }
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        let mut sprites: Vec<Sprite> = Vec::new();
        if let Some(world) = &self.world {
            sprites.extend(world.items.iter().map(render::item_sprite));
            sprites.extend(
                world
                    .enemies
                    .iter()
                    .filter(|e| e.is_alive())
                    .map(render::enemy_sprite),
            );
            let remote_present = !matches!(self.phase, SessionPhase::PeerLost { .. });
            if remote_present && self.remote.is_alive() {
                sprites.push(render::player_sprite(&self.remote));
            }
            if self.local.is_alive() {
                sprites.push(render::player_sprite(&self.local));
            }
        }

        RenderFrame {
            tick: self.tick,
            phase: &self.phase,
            authority: self.authority,
            grid: self.world.as_ref().map(|w| &w.grid),
            sprites,
            effects: &self.effects,
            local_position: self.local.position(),
            local_hp: self.local.body.hp,
            local_max_hp: self.local.body.max_hp,
            local_class: self.local.class,
        }
    }
}
