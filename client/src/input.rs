//! Keyboard input mapping with command sequencing

use shared::{Action, Command, Direction};

/// What a key press asks the client to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A command ready to send, already stamped with its sequence number
    Command(Command),
    Quit,
}

/// Turns key presses into sequenced commands for one player slot
pub struct InputManager {
    slot: u32,
    next_sequence: u64,
}

impl InputManager {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            next_sequence: 1,
        }
    }

    /// Maps a key to an input. Keys are case-insensitive:
    /// w/a/s/d move, e interacts, r restarts and q quits.
    ///
    /// Only keys that produce a command consume a sequence number.
    pub fn handle_key(&mut self, key: char) -> Option<Input> {
        let action = match key.to_ascii_lowercase() {
            'w' => Action::Move(Direction::Up),
            'a' => Action::Move(Direction::Left),
            's' => Action::Move(Direction::Down),
            'd' => Action::Move(Direction::Right),
            'e' => Action::Interact,
            'r' => Action::Restart,
            'q' => return Some(Input::Quit),
            _ => return None,
        };

        let command = Command::new(self.slot, action, self.next_sequence);
        self.next_sequence += 1;
        Some(Input::Command(command))
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Sequence number the next command will carry
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}
