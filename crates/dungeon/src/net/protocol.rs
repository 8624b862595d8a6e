use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::entity::PlayerClass;
use crate::map::{Grid, GridError};

pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x44554E47;

pub const ITEM_KIND_HEAL: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
        }
    }
}

impl PacketHeader {
    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

/// Tile map as glyph rows (`#`, `.`, `~`), one `Vec` per row.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct GridState {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<Vec<u8>>,
}

impl GridState {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width() as u32,
            height: grid.height() as u32,
            rows: grid.to_rows(),
        }
    }

    pub fn to_grid(&self, expected_width: usize, expected_height: usize) -> Result<Grid, GridError> {
        let (width, height) = (self.width as usize, self.height as usize);
        if width != expected_width || height != expected_height {
            return Err(GridError::DimensionMismatch {
                expected_width,
                expected_height,
                actual_width: width,
                actual_height: height,
            });
        }
        Grid::from_rows(width, height, &self.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct EnemyState {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub boss: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct ItemState {
    pub x: i32,
    pub y: i32,
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InitMessage {
    pub grid: GridState,
    pub enemies: Vec<EnemyState>,
    pub items: Vec<ItemState>,
    pub spawn: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct SyncMessage {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub class: PlayerClass,
    pub attack: Option<[i32; 2]>,
    /// Only the authority sends enemies.
    pub enemies: Option<Vec<EnemyState>>,
    /// Running total of contact damage the authority's enemies have dealt to the receiver.
    pub peer_damage_total: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum NetworkMessage {
    Init(InitMessage),
    Sync(SyncMessage),
}

impl NetworkMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "INIT",
            Self::Sync(_) => "SYNC",
        }
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub message: NetworkMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("bad packet header (magic {magic:#010x}, version {version})")]
    BadHeader { magic: u32, version: u32 },
}

impl Packet {
    pub fn new(message: NetworkMessage) -> Self {
        Self {
            header: PacketHeader::default(),
            message,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(ProtocolError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, ProtocolError> {
        // Transport buffers carry no alignment guarantee.
        let mut aligned = AlignedVec::<16>::with_capacity(data.len());
        aligned.extend_from_slice(data);
        rkyv::from_bytes::<Self, rancor::Error>(&aligned).map_err(ProtocolError::Deserialize)
    }
}

pub fn encode_message(message: NetworkMessage) -> Result<Vec<u8>, ProtocolError> {
    Packet::new(message).serialize()
}

pub fn decode_message(data: &[u8]) -> Result<NetworkMessage, ProtocolError> {
    let packet = Packet::deserialize(data)?;
    if !packet.header.is_valid() {
        return Err(ProtocolError::BadHeader {
            magic: packet.header.magic,
            version: packet.header.version,
        });
    }
    Ok(packet.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Tile;

    fn sample_sync() -> SyncMessage {
        SyncMessage {
            x: 4,
            y: 9,
            hp: 77,
            class: PlayerClass::Mage,
            attack: Some([5, 9]),
            enemies: Some(vec![EnemyState {
                id: 3,
                x: 10,
                y: 11,
                hp: 40,
                boss: false,
            }]),
            peer_damage_total: None,
        }
    }

    #[test]
    fn sync_survives_encoding() {
        let message = NetworkMessage::Sync(sample_sync());
        let bytes = encode_message(message.clone()).unwrap();
        assert_eq!(decode_message(&bytes).unwrap(), message);
    }

    #[test]
    fn decode_handles_unaligned_input() {
        let bytes = encode_message(NetworkMessage::Sync(sample_sync())).unwrap();
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);
        assert!(decode_message(&shifted[1..]).is_ok());
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let mut packet = Packet::new(NetworkMessage::Sync(sample_sync()));
        packet.header.magic = 0xDEADBEEF;
        let bytes = packet.serialize().unwrap();
        assert!(matches!(
            decode_message(&bytes),
            Err(ProtocolError::BadHeader {
                magic: 0xDEADBEEF,
                ..
            })
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode_message(&[1, 2, 3, 4, 5, 6, 7]).is_err());
    }

    #[test]
    fn grid_state_rejects_wrong_dimensions() {
        let grid = Grid::filled(8, 6, Tile::Wall);
        let state = GridState::from_grid(&grid);

        assert_eq!(state.to_grid(8, 6).unwrap(), grid);
        assert!(matches!(
            state.to_grid(50, 50),
            Err(GridError::DimensionMismatch { actual_width: 8, .. })
        ));
    }
}
