use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use dungeon::InputState;

/// Terminals report presses and auto-repeats but rarely releases, so a key counts as held
/// for a short window after its last press.
const HOLD: Duration = Duration::from_millis(150);

pub struct KeyLatch {
    last_press: [Option<Instant>; 6],
}

const FLAGS: [InputState; 6] = [
    InputState::UP,
    InputState::DOWN,
    InputState::LEFT,
    InputState::RIGHT,
    InputState::ATTACK,
    InputState::SKILL,
];

impl KeyLatch {
    pub fn new() -> Self {
        Self {
            last_press: [None; 6],
        }
    }

    pub fn press(&mut self, code: KeyCode) {
        self.press_at(code, Instant::now());
    }

    fn press_at(&mut self, code: KeyCode, at: Instant) {
        if let Some(slot) = key_slot(code) {
            self.last_press[slot] = Some(at);
        }
    }

    pub fn sample(&self, now: Instant) -> InputState {
        let mut input = InputState::empty();
        for (flag, pressed) in FLAGS.iter().zip(self.last_press) {
            if pressed.is_some_and(|at| now.saturating_duration_since(at) < HOLD) {
                input |= *flag;
            }
        }
        input
    }
}

fn key_slot(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(0),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(1),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(2),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(3),
        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char(' ') => Some(4),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_held_briefly() {
        let mut keys = KeyLatch::new();
        let t0 = Instant::now();
        keys.press_at(KeyCode::Char('d'), t0);
        keys.press_at(KeyCode::Char('z'), t0);

        assert_eq!(keys.sample(t0), InputState::RIGHT | InputState::ATTACK);
        assert_eq!(keys.sample(t0 + HOLD), InputState::empty());
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut keys = KeyLatch::new();
        keys.press_at(KeyCode::Char('p'), Instant::now());
        assert_eq!(keys.sample(Instant::now()), InputState::empty());
    }
}
