use dungeon::{GameConfig, PlayerClass};

use crate::Args;

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub game: GameConfig,
    pub class: PlayerClass,
    pub host: bool,
    pub max_ticks: Option<u64>,
}

impl PeerConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            game: GameConfig {
                tick_rate: args.tick_rate,
                seed: args.seed,
                ..Default::default()
            },
            class: args.class.into(),
            host: args.host.is_some(),
            max_ticks: args.ticks,
        }
    }
}
