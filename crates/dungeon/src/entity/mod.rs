mod body;
mod enemy;
mod item;
mod player;

pub use body::Body;
pub use enemy::{Enemy, EnemyKind};
pub use item::{Item, ItemKind};
pub use player::{Player, PlayerClass};
