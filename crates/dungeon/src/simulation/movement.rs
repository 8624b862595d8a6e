use glam::IVec2;

use crate::config::GameConfig;
use crate::entity::{Enemy, Item, Player};
use crate::map::{Grid, Tile};

use super::combat::{self, Pickup};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Still cooling down from the previous move.
    Cooldown,
    Idle,
    /// Walked into a wall. The cooldown restarts regardless.
    Blocked,
    Moved {
        to: IVec2,
        hazard_damage: i32,
        pickups: Vec<Pickup>,
    },
}

/// Moves the player one cell, subject to the move cooldown.
///
/// A zero cooldown lets the move through and restarts it at `move_delay`; otherwise the
/// cooldown just counts down. Hazard damage is applied on entry, then any item on the
/// destination is consumed.
pub fn move_player(
    player: &mut Player,
    direction: Option<IVec2>,
    grid: &Grid,
    items: &mut Vec<Item>,
    config: &GameConfig,
) -> MoveOutcome {
    let body = &mut player.body;
    if body.move_cooldown > 0 {
        body.move_cooldown -= 1;
        return MoveOutcome::Cooldown;
    }

    let Some(direction) = direction.filter(|d| d.abs().element_sum() == 1) else {
        return MoveOutcome::Idle;
    };

    body.move_cooldown = config.move_delay;

    let to = body.position + direction;
    let tile = grid.get(to);
    if tile == Tile::Wall {
        return MoveOutcome::Blocked;
    }

    body.position = to;
    body.facing = direction;

    let hazard_damage = if tile == Tile::Hazard {
        body.apply_damage(config.hazard_damage)
    } else {
        0
    };
    let pickups = combat::pick_up_items(body, items, config);

    MoveOutcome::Moved {
        to,
        hazard_damage,
        pickups,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub target: IVec2,
    pub hits: usize,
}

/// Attacks the cell in front of the player. The cooldown counts down before it is checked,
/// so a strike fires on the tick it reaches zero.
pub fn attack(
    player: &mut Player,
    wants_attack: bool,
    enemies: &mut [Enemy],
    config: &GameConfig,
) -> Option<Strike> {
    let damage = player.attack_damage(config);
    let body = &mut player.body;
    body.attack_cooldown = body.attack_cooldown.saturating_sub(1);
    if !wants_attack || body.attack_cooldown > 0 {
        return None;
    }

    let target = body.position + body.facing;
    let hits = combat::strike_cell(enemies, target, damage);
    body.attack_cooldown = config.attack_delay;

    Some(Strike { target, hits })
}
