use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::config::{ClassStats, GameConfig};

use super::Body;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[rkyv(derive(Debug))]
pub enum PlayerClass {
    #[default]
    Warrior,
    Mage,
}

impl PlayerClass {
    pub fn stats(self, config: &GameConfig) -> ClassStats {
        match self {
            Self::Warrior => config.warrior,
            Self::Mage => config.mage,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub body: Body,
    pub class: PlayerClass,
}

impl Player {
    pub fn new(class: PlayerClass, position: IVec2, config: &GameConfig) -> Self {
        Self {
            body: Body::new(position, class.stats(config).max_hp),
            class,
        }
    }

    pub fn attack_damage(&self, config: &GameConfig) -> i32 {
        self.class.stats(config).attack_damage
    }

    /// Switches class and rescales max hp, keeping hp within bounds.
    pub fn set_class(&mut self, class: PlayerClass, config: &GameConfig) {
        if self.class != class {
            self.class = class;
            self.body.max_hp = class.stats(config).max_hp;
            self.body.set_hp(self.body.hp);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    pub fn position(&self) -> IVec2 {
        self.body.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_fixes_max_hp() {
        let config = GameConfig::default();
        let warrior = Player::new(PlayerClass::Warrior, IVec2::ZERO, &config);
        let mage = Player::new(PlayerClass::Mage, IVec2::ZERO, &config);

        assert_eq!(warrior.body.max_hp, 120);
        assert_eq!(mage.body.max_hp, 80);
        assert!(warrior.attack_damage(&config) > mage.attack_damage(&config));
    }

    #[test]
    fn class_switch_clamps_hp() {
        let config = GameConfig::default();
        let mut player = Player::new(PlayerClass::Warrior, IVec2::ZERO, &config);
        player.set_class(PlayerClass::Mage, &config);
        assert_eq!(player.body.hp, 80);
    }
}
