use glam::IVec2;

/// State every grid-bound creature shares. `hp` stays within `0..=max_hp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub position: IVec2,
    pub hp: i32,
    pub max_hp: i32,
    /// Unit vector along one axis.
    pub facing: IVec2,
    pub move_cooldown: u32,
    pub attack_cooldown: u32,
}

impl Body {
    pub fn new(position: IVec2, max_hp: i32) -> Self {
        Self {
            position,
            hp: max_hp,
            max_hp,
            facing: IVec2::Y,
            move_cooldown: 0,
            attack_cooldown: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Returns the hp actually removed. Negative amounts are ignored.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        before - self.hp
    }

    /// Returns the hp actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    pub fn manhattan_distance(&self, other: IVec2) -> i32 {
        let delta = (other - self.position).abs();
        delta.x + delta.y
    }
}
