use serde::{Deserialize, Serialize};

/// Tag of a single dungeon cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Wall,
    Room,
    TrapRoom,
    BossRoom,
    /// Only ever written by a corridor planner
    Corridor,
}

impl TileType {
    /// Any of the three room tags
    pub fn is_room(&self) -> bool {
        matches!(self, TileType::Room | TileType::TrapRoom | TileType::BossRoom)
    }

    pub fn is_walkable(&self) -> bool {
        !matches!(self, TileType::Wall)
    }

    /// Character used by the debug rendering of a grid
    pub fn glyph(&self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Room => '.',
            TileType::TrapRoom => '^',
            TileType::BossRoom => 'B',
            TileType::Corridor => ',',
        }
    }
}
