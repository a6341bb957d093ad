//! Tile kinds and the rectangular tile grid loaded from a map file

use crate::Position;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Drawn in place of any cell a player has not revealed yet.
pub const FOG_SYMBOL: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Wall,
    Barrier,
    Vegetation,
    /// Placed by the server; interacting next to it reveals the whole map.
    SpecialItem,
    /// Only used when drawing players over the grid.
    Character,
}

impl Tile {
    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '▤',
            Tile::Barrier => '#',
            Tile::Vegetation => '♣',
            Tile::SpecialItem => 'P',
            Tile::Character => '☺',
        }
    }

    /// Tangible tiles block movement.
    pub fn is_tangible(self) -> bool {
        match self {
            Tile::Empty | Tile::Vegetation => false,
            Tile::Wall | Tile::Barrier | Tile::SpecialItem | Tile::Character => true,
        }
    }

    /// Map files only carry terrain; anything unrecognised is open floor.
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            '▤' => Tile::Wall,
            '#' => Tile::Barrier,
            '♣' => Tile::Vegetation,
            _ => Tile::Empty,
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map contains no tiles")]
    Empty,
    #[error("map needs at least {needed} passable cells, found {found}")]
    NotEnoughOpenCells { needed: usize, found: usize },
}

/// Row-major tile matrix. Rows are padded so every row has the same width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Parses one row per line and one tile per character.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let rows: Vec<Vec<Tile>> = text
            .lines()
            .map(|line| line.chars().map(Tile::from_symbol).collect())
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(MapError::Empty);
        }

        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, Tile::Empty);
            tiles.extend(row);
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// A grid of the given size with every cell set to `tile`.
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    pub fn get(&self, position: Position) -> Option<Tile> {
        self.index(position).map(|i| self.tiles[i])
    }

    /// Replaces a tile. Returns false when the position is off-grid.
    pub fn set(&mut self, position: Position, tile: Tile) -> bool {
        match self.index(position) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// True when the position is on the grid and its tile does not block.
    pub fn is_passable(&self, position: Position) -> bool {
        self.get(position).map_or(false, |tile| !tile.is_tangible())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width)
    }

    /// Every passable cell, in row-major order.
    pub fn open_cells(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.is_tangible())
            .map(|(i, _)| Position::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}
