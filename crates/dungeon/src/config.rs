use serde::{Deserialize, Serialize};

pub const DEFAULT_TICK_RATE: u32 = 60;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("grid {width}x{height} cannot hold a {room_max_size}-cell room with a border")]
    GridTooSmall {
        width: usize,
        height: usize,
        room_max_size: usize,
    },
    #[error("room size range {min}..={max} is empty")]
    EmptyRoomRange { min: usize, max: usize },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Which carving algorithm builds the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorKind {
    Rooms,
    RandomWalk { steps: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    pub max_hp: i32,
    pub attack_damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_hp: i32,
    pub contact_damage: i32,
    /// Ticks between AI activations.
    pub cadence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_width: usize,
    pub grid_height: usize,

    pub generator: GeneratorKind,
    pub room_count: usize,
    pub room_min_size: usize,
    pub room_max_size: usize,
    pub hazard_chance: f64,
    pub heal_item_chance: f64,

    pub tick_rate: u32,

    pub move_delay: u32,
    pub attack_delay: u32,
    pub hazard_damage: i32,
    pub heal_amount: i32,

    pub warrior: ClassStats,
    pub mage: ClassStats,

    pub regular_enemy: EnemyStats,
    pub boss_enemy: EnemyStats,
    pub ai_step_x_chance: f64,

    pub attack_effect_ticks: u32,
    pub init_resend_interval: u32,

    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 50,
            grid_height: 50,

            generator: GeneratorKind::Rooms,
            room_count: 15,
            room_min_size: 4,
            room_max_size: 9,
            hazard_chance: 0.02,
            heal_item_chance: 0.5,

            tick_rate: DEFAULT_TICK_RATE,

            move_delay: 8,
            attack_delay: 20,
            hazard_damage: 5,
            heal_amount: 30,

            warrior: ClassStats {
                max_hp: 120,
                attack_damage: 20,
            },
            mage: ClassStats {
                max_hp: 80,
                attack_damage: 10,
            },

            regular_enemy: EnemyStats {
                max_hp: 40,
                contact_damage: 8,
                cadence: 60,
            },
            boss_enemy: EnemyStats {
                max_hp: 200,
                contact_damage: 15,
                cadence: 40,
            },
            ai_step_x_chance: 0.5,

            attack_effect_ticks: 12,
            init_resend_interval: 30,

            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_min_size == 0 {
            return Err(ConfigError::Zero("room_min_size"));
        }
        if self.room_min_size > self.room_max_size {
            return Err(ConfigError::EmptyRoomRange {
                min: self.room_min_size,
                max: self.room_max_size,
            });
        }
        // One wall cell on each side plus the exclusive upper bound of the placement roll.
        let needed = self.room_max_size + 3;
        if self.grid_width < needed || self.grid_height < needed {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
                room_max_size: self.room_max_size,
            });
        }
        if self.room_count == 0 {
            return Err(ConfigError::Zero("room_count"));
        }
        if let GeneratorKind::RandomWalk { steps: 0 } = self.generator {
            return Err(ConfigError::Zero("random walk steps"));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Zero("tick_rate"));
        }
        if self.regular_enemy.cadence == 0 {
            return Err(ConfigError::Zero("regular_enemy.cadence"));
        }
        if self.boss_enemy.cadence == 0 {
            return Err(ConfigError::Zero("boss_enemy.cadence"));
        }
        if self.init_resend_interval == 0 {
            return Err(ConfigError::Zero("init_resend_interval"));
        }
        check_probability("hazard_chance", self.hazard_chance)?;
        check_probability("heal_item_chance", self.heal_item_chance)?;
        check_probability("ai_step_x_chance", self.ai_step_x_chance)?;
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}
