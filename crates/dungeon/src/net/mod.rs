mod inbox;
mod protocol;
mod stats;
mod transport;
mod udp;

pub use inbox::{Inbound, Inbox};
pub use protocol::{
    EnemyState, GridState, ITEM_KIND_HEAL, InitMessage, ItemState, NetworkMessage, Packet,
    PacketHeader, PROTOCOL_MAGIC, PROTOCOL_VERSION, ProtocolError, SyncMessage, decode_message,
    encode_message,
};
pub use stats::{NetworkStats, PacketLossSimulation};
pub use transport::{LoopbackTransport, Transport, TransportEvent};
pub use udp::{LinkState, MAX_DATAGRAM_SIZE, UdpTransport};
