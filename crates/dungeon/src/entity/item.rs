use glam::IVec2;

use crate::net::{ItemState, ITEM_KIND_HEAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub position: IVec2,
    pub kind: ItemKind,
}

impl Item {
    pub fn heal(position: IVec2) -> Self {
        Self {
            position,
            kind: ItemKind::Heal,
        }
    }

    pub fn to_network_state(&self) -> ItemState {
        let kind = match self.kind {
            ItemKind::Heal => ITEM_KIND_HEAL,
        };
        ItemState {
            x: self.position.x,
            y: self.position.y,
            kind,
        }
    }

    /// Unknown kinds are dropped so a newer peer's items do not break older ones.
    pub fn from_network_state(state: &ItemState) -> Option<Self> {
        match state.kind {
            ITEM_KIND_HEAL => Some(Self::heal(IVec2::new(state.x, state.y))),
            _ => None,
        }
    }
}
