use glam::IVec2;

use crate::config::{EnemyStats, GameConfig};
use crate::net::EnemyState;

use super::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Regular,
    Boss,
}

impl EnemyKind {
    pub fn from_boss_flag(boss: bool) -> Self {
        if boss { Self::Boss } else { Self::Regular }
    }

    pub fn stats(self, config: &GameConfig) -> EnemyStats {
        match self {
            Self::Regular => config.regular_enemy,
            Self::Boss => config.boss_enemy,
        }
    }

    pub fn is_boss(self) -> bool {
        self == Self::Boss
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub kind: EnemyKind,
    pub ai_timer: u32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, position: IVec2, config: &GameConfig) -> Self {
        Self {
            id,
            body: Body::new(position, kind.stats(config).max_hp),
            kind,
            ai_timer: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    pub fn to_network_state(&self) -> EnemyState {
        EnemyState {
            id: self.id,
            x: self.body.position.x,
            y: self.body.position.y,
            hp: self.body.hp,
            boss: self.kind.is_boss(),
        }
    }

    /// The AI timer is authority-local and starts from zero on the receiving side.
    pub fn from_network_state(state: &EnemyState, config: &GameConfig) -> Self {
        let mut enemy = Self::new(
            state.id,
            EnemyKind::from_boss_flag(state.boss),
            IVec2::new(state.x, state.y),
            config,
        );
        enemy.body.set_hp(state.hp);
        enemy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_state_preserves_identity() {
        let config = GameConfig::default();
        let mut boss = Enemy::new(7, EnemyKind::Boss, IVec2::new(12, 30), &config);
        boss.body.hp = 150;

        let restored = Enemy::from_network_state(&boss.to_network_state(), &config);

        assert_eq!(restored.id, 7);
        assert_eq!(restored.kind, EnemyKind::Boss);
        assert_eq!(restored.body.position, IVec2::new(12, 30));
        assert_eq!(restored.body.hp, 150);
        assert_eq!(restored.body.max_hp, 200);
    }

    #[test]
    fn out_of_range_hp_is_clamped() {
        let config = GameConfig::default();
        let state = EnemyState {
            id: 1,
            x: 0,
            y: 0,
            hp: 9999,
            boss: false,
        };
        assert_eq!(Enemy::from_network_state(&state, &config).body.hp, 40);
    }
}
