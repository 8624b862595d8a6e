use glam::IVec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::entity::{Enemy, Player};
use crate::map::Grid;

/// Which player an enemy went after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiReport {
    pub damage_to_local: i32,
    pub damage_to_remote: i32,
    pub steps: usize,
}

/// Greedy chaser run only by the authority.
///
/// Each enemy acts once every `cadence` ticks. It picks the nearest living player by
/// manhattan distance, hits it when adjacent, and otherwise takes one axis-aligned step
/// toward it. Steps into walls are dropped; enemies may share cells.
pub struct EnemyAi<'a> {
    config: &'a GameConfig,
}

impl<'a> EnemyAi<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// `remote` is `None` once the other peer is gone.
    pub fn update<R: Rng + ?Sized>(
        &self,
        enemies: &mut [Enemy],
        grid: &Grid,
        local: &mut Player,
        mut remote: Option<&mut Player>,
        rng: &mut R,
    ) -> AiReport {
        let mut report = AiReport::default();

        for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
            let cadence = enemy.kind.stats(self.config).cadence;
            enemy.ai_timer += 1;
            if enemy.ai_timer < cadence {
                continue;
            }
            enemy.ai_timer = 0;

            let Some(target) = pick_target(enemy, local, remote.as_deref()) else {
                continue;
            };
            let player = match target {
                Target::Local => &mut *local,
                Target::Remote => match remote.as_deref_mut() {
                    Some(player) => player,
                    None => continue,
                },
            };

            if enemy.body.manhattan_distance(player.position()) == 1 {
                let contact = enemy.kind.stats(self.config).contact_damage;
                let dealt = player.body.apply_damage(contact);
                match target {
                    Target::Local => report.damage_to_local += dealt,
                    Target::Remote => report.damage_to_remote += dealt,
                }
            } else if self.step_toward(enemy, player.position(), grid, rng) {
                report.steps += 1;
            }
        }

        report
    }

    fn step_toward<R: Rng + ?Sized>(
        &self,
        enemy: &mut Enemy,
        goal: IVec2,
        grid: &Grid,
        rng: &mut R,
    ) -> bool {
        let delta = (goal - enemy.body.position).signum();
        let prefer_x = rng.gen_bool(self.config.ai_step_x_chance);
        let step = if (prefer_x && delta.x != 0) || delta.y == 0 {
            IVec2::new(delta.x, 0)
        } else {
            IVec2::new(0, delta.y)
        };

        let next = enemy.body.position + step;
        if step == IVec2::ZERO || !grid.is_passable(next) {
            return false;
        }
        enemy.body.position = next;
        true
    }
}

/// Nearest living player. On a tie the remote player is chosen.
fn pick_target(enemy: &Enemy, local: &Player, remote: Option<&Player>) -> Option<Target> {
    let distance = |player: &Player| {
        player
            .is_alive()
            .then(|| enemy.body.manhattan_distance(player.position()))
    };

    match (distance(local), remote.and_then(distance)) {
        (Some(l), Some(r)) if l < r => Some(Target::Local),
        (_, Some(_)) => Some(Target::Remote),
        (Some(_), None) => Some(Target::Local),
        (None, None) => None,
    }
}
