use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tile::TileType;

/// Square grid of tagged cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonGrid {
    pub side: usize,
    pub tiles: Vec<TileType>,
}

impl DungeonGrid {
    /// All-wall grid of `side * side` cells
    pub fn new(side: usize) -> Self {
        Self {
            side,
            tiles: vec![TileType::Wall; side * side],
        }
    }

    /// Grid whose side spans the diagonal of `extent`.
    pub fn for_extent(extent: Vec2) -> Self {
        Self::new(Self::side_for(extent))
    }

    pub fn side_for(extent: Vec2) -> usize {
        extent.length().ceil() as usize
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.side + x as usize)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.side && (y as usize) < self.side
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        self.index(x, y).map(|idx| self.tiles[idx])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut TileType> {
        self.index(x, y).map(move |idx| &mut self.tiles[idx])
    }

    /// Set a cell; returns false if it lies outside the grid
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Coordinates of every cell carrying `tile`
    pub fn cells_of(&self, tile: TileType) -> Vec<(i32, i32)> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == tile)
            .map(|(idx, _)| ((idx % self.side) as i32, (idx / self.side) as i32))
            .collect()
    }
}

impl fmt::Display for DungeonGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.side.max(1)) {
            let line: String = row.iter().map(TileType::glyph).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
