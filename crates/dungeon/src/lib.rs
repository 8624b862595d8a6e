pub mod config;
pub mod entity;
pub mod event;
pub mod map;
pub mod net;
pub mod render;
pub mod simulation;

pub use config::{
    ClassStats, ConfigError, DEFAULT_TICK_RATE, EnemyStats, GameConfig, GeneratorKind,
};
pub use entity::{Body, Enemy, EnemyKind, Item, ItemKind, Player, PlayerClass};
pub use event::SessionEvent;
pub use map::{GeneratedMap, Grid, GridError, MapGenerator, Room, Tile};
pub use net::{
    EnemyState, GridState, InitMessage, ItemState, LinkState, LoopbackTransport, NetworkMessage,
    NetworkStats, PacketLossSimulation, ProtocolError, SyncMessage, Transport, TransportEvent,
    UdpTransport,
};
pub use render::{AttackEffect, RenderFrame, Renderer, Rgb, Sprite};
pub use simulation::{
    EndCause, EnemyAi, FixedTimestep, InputState, Session, SessionLoop, SessionPhase, World,
};
