use glam::IVec2;

use crate::entity::{Enemy, EnemyKind, Item, ItemKind, Player, PlayerClass};
use crate::map::{Grid, Tile};
use crate::simulation::SessionPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub position: IVec2,
    pub glyph: char,
    pub color: Rgb,
}

/// Flash on an attacked cell. Purely visual, never read by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackEffect {
    pub position: IVec2,
    pub remaining: u32,
}

impl AttackEffect {
    pub fn new(position: IVec2, duration: u32) -> Self {
        Self {
            position,
            remaining: duration,
        }
    }
}

#[derive(Debug)]
pub struct RenderFrame<'a> {
    pub tick: u32,
    pub phase: &'a SessionPhase,
    pub authority: bool,
    pub grid: Option<&'a Grid>,
    /// Back to front: items, enemies, remote player, local player.
    pub sprites: Vec<Sprite>,
    pub effects: &'a [AttackEffect],
    pub local_position: IVec2,
    pub local_hp: i32,
    pub local_max_hp: i32,
    pub local_class: PlayerClass,
}

pub trait Renderer {
    fn draw(&mut self, frame: &RenderFrame<'_>);
}

impl<F> Renderer for F
where
    F: FnMut(&RenderFrame<'_>),
{
    fn draw(&mut self, frame: &RenderFrame<'_>) {
        self(frame)
    }
}

pub fn tile_color(tile: Tile) -> Rgb {
    match tile {
        Tile::Wall => Rgb(0x55, 0x55, 0x55),
        Tile::Floor => Rgb(0x22, 0x22, 0x22),
        Tile::Hazard => Rgb(0xe6, 0x7e, 0x22),
    }
}

pub fn player_sprite(player: &Player) -> Sprite {
    let color = match player.class {
        PlayerClass::Warrior => Rgb(0x34, 0x98, 0xdb),
        PlayerClass::Mage => Rgb(0x9b, 0x59, 0xb6),
    };
    Sprite {
        position: player.position(),
        glyph: '@',
        color,
    }
}

pub fn enemy_sprite(enemy: &Enemy) -> Sprite {
    let (glyph, color) = match enemy.kind {
        EnemyKind::Regular => ('E', Rgb(0xe7, 0x4c, 0x3c)),
        EnemyKind::Boss => ('B', Rgb(0xc0, 0x39, 0x2b)),
    };
    Sprite {
        position: enemy.body.position,
        glyph,
        color,
    }
}

pub fn item_sprite(item: &Item) -> Sprite {
    match item.kind {
        ItemKind::Heal => Sprite {
            position: item.position,
            glyph: '+',
            color: Rgb(0x2e, 0xcc, 0x71),
        },
    }
}
