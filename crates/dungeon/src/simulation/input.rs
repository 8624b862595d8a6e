use bitflags::bitflags;
use glam::IVec2;

bitflags! {
    /// Keys held during one tick. Only the local player is ever driven by this.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputState: u8 {
        const UP     = 1 << 0;
        const DOWN   = 1 << 1;
        const LEFT   = 1 << 2;
        const RIGHT  = 1 << 3;
        const ATTACK = 1 << 4;
        /// Sampled for forward compatibility, no effect yet.
        const SKILL  = 1 << 5;
    }
}

impl InputState {
    /// First held direction in up, down, left, right order. Y grows downward.
    pub fn direction(self) -> Option<IVec2> {
        if self.contains(Self::UP) {
            Some(IVec2::NEG_Y)
        } else if self.contains(Self::DOWN) {
            Some(IVec2::Y)
        } else if self.contains(Self::LEFT) {
            Some(IVec2::NEG_X)
        } else if self.contains(Self::RIGHT) {
            Some(IVec2::X)
        } else {
            None
        }
    }

    pub fn attack(self) -> bool {
        self.contains(Self::ATTACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_keys_take_priority() {
        let input = InputState::LEFT | InputState::DOWN | InputState::RIGHT;
        assert_eq!(input.direction(), Some(IVec2::Y));
        assert_eq!((InputState::UP | InputState::DOWN).direction(), Some(IVec2::NEG_Y));
        assert_eq!((InputState::RIGHT | InputState::LEFT).direction(), Some(IVec2::NEG_X));
    }

    #[test]
    fn empty_input_has_no_direction() {
        assert_eq!(InputState::empty().direction(), None);
        assert_eq!(InputState::ATTACK.direction(), None);
        assert!(InputState::ATTACK.attack());
    }
}
