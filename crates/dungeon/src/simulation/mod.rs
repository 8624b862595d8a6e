mod ai;
mod combat;
mod input;
mod movement;
mod session;
mod session_loop;
mod sync;
mod tick;

pub use ai::{AiReport, EnemyAi, Target};
pub use combat::{Pickup, pick_up_items, prune_dead, spawn_entities, strike_cell};
pub use input::InputState;
pub use movement::{MoveOutcome, Strike, attack, move_player};
pub use session::{EndCause, Session, SessionPhase, World};
pub use session_loop::SessionLoop;
pub use tick::FixedTimestep;
