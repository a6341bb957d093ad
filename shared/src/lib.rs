//! Types shared by the game server and its polling clients: the tile grid,
//! player records, per-player visibility masks, the snapshot aggregate and
//! the wire protocol.

pub mod map;
pub mod protocol;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use map::{MapError, Tile, TileGrid, FOG_SYMBOL};
pub use protocol::{
    encode_frame, read_packet, write_packet, FrameError, GameError, Packet, MAX_FRAME_LEN,
};

pub const DEFAULT_PORT: u16 = 8973;
pub const DEFAULT_VISIBILITY_RADIUS: u32 = 3;
pub const MAX_PLAYERS: usize = 2;

/// Grid coordinate. `x` is the column, `y` the row, both 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbours, in up/down/left/right order.
    pub fn neighbours(self) -> [Position; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .map(|direction| {
            let (dx, dy) = direction.delta();
            self.offset(dx, dy)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step as `(dx, dy)`; rows grow downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A player intent carried by [`Command::action`].
///
/// The wire keeps the action as a string so that unknown kinds reach the
/// server and can be rejected there with [`GameError::InvalidAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Direction),
    Interact,
    Restart,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Move(Direction::Up) => "move_up",
            Action::Move(Direction::Down) => "move_down",
            Action::Move(Direction::Left) => "move_left",
            Action::Move(Direction::Right) => "move_right",
            Action::Interact => "interact",
            Action::Restart => "restart",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move_up" => Ok(Action::Move(Direction::Up)),
            "move_down" => Ok(Action::Move(Direction::Down)),
            "move_left" => Ok(Action::Move(Direction::Left)),
            "move_right" => Ok(Action::Move(Direction::Right)),
            "interact" => Ok(Action::Interact),
            "restart" => Ok(Action::Restart),
            other => Err(GameError::InvalidAction(other.to_string())),
        }
    }
}

/// A command submitted by a client for one player slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub slot: u32,
    pub action: String,
    /// Strictly increasing per slot, chosen by the issuing client.
    pub sequence: u64,
}

impl Command {
    pub fn new(slot: u32, action: Action, sequence: u64) -> Self {
        Self {
            slot,
            action: action.as_str().to_string(),
            sequence,
        }
    }
}

/// One of the two fixed player slots. An empty name marks the slot as free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub slot: u32,
    pub name: String,
    pub position: Position,
}

impl Player {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            name: String::new(),
            position: Position::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Cells of the grid disclosed to one player. Cells only ever go from
/// hidden to revealed until the mask is recreated on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl VisibilityMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_revealed(&self, position: Position) -> bool {
        self.index(position).map_or(false, |i| self.cells[i])
    }

    /// Marks a cell as revealed. Returns false when the position is off-grid.
    pub fn reveal(&mut self, position: Position) -> bool {
        match self.index(position) {
            Some(i) => {
                self.cells[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn reveal_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = true);
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.cells.iter().all(|cell| *cell)
    }

    pub fn is_fully_hidden(&self) -> bool {
        self.cells.iter().all(|cell| !*cell)
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

/// The authoritative aggregate. Every snapshot handed to a client is a full
/// copy of this value, including both players' visibility masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub map: TileGrid,
    pub players: [Player; MAX_PLAYERS],
    pub revealed: [VisibilityMask; MAX_PLAYERS],
    pub fog_enabled: bool,
    pub visibility_radius: u32,
    pub player_count: u32,
}

impl GameState {
    /// Fresh aggregate: both slots free, fog on, nothing revealed.
    pub fn new(map: TileGrid, visibility_radius: u32) -> Self {
        let revealed = [
            VisibilityMask::new(map.width(), map.height()),
            VisibilityMask::new(map.width(), map.height()),
        ];

        Self {
            map,
            players: [Player::new(1), Player::new(2)],
            revealed,
            fog_enabled: true,
            visibility_radius,
            player_count: 0,
        }
    }

    /// Maps slot 1/2 to an array index.
    pub fn slot_index(slot: u32) -> Option<usize> {
        match slot {
            1 => Some(0),
            2 => Some(1),
            _ => None,
        }
    }

    pub fn player(&self, slot: u32) -> Option<&Player> {
        Self::slot_index(slot).map(|i| &self.players[i])
    }

    pub fn player_mut(&mut self, slot: u32) -> Option<&mut Player> {
        Self::slot_index(slot).map(move |i| &mut self.players[i])
    }

    /// The player in `slot`, only if that slot is occupied.
    pub fn active_player(&self, slot: u32) -> Option<&Player> {
        self.player(slot).filter(|player| player.is_active())
    }

    pub fn visibility(&self, slot: u32) -> Option<&VisibilityMask> {
        Self::slot_index(slot).map(|i| &self.revealed[i])
    }

    pub fn visibility_mut(&mut self, slot: u32) -> Option<&mut VisibilityMask> {
        Self::slot_index(slot).map(move |i| &mut self.revealed[i])
    }

    /// Recreates both masks with every cell hidden.
    pub fn clear_visibility(&mut self) {
        let (width, height) = (self.map.width(), self.map.height());
        self.revealed = [
            VisibilityMask::new(width, height),
            VisibilityMask::new(width, height),
        ];
    }
}
