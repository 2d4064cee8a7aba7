use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A rectangular room before or after physics placement.
///
/// `x`/`y` is the centroid in world space; sides are whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomFootprint {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
}

impl RoomFootprint {
    pub fn new(width: f32, height: f32, x: f32, y: f32) -> Self {
        Self { width, height, x, y }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Length of the room's diagonal
    pub fn diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    /// Same room moved to a new centroid
    pub fn moved_to(&self, position: Vec2) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..*self
        }
    }

    /// Corner offsets relative to the centroid, in winding order.
    pub fn local_vertices(&self) -> [Vec2; 4] {
        let half = self.size() * 0.5;
        [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
    }

    /// Cell-space bounds `(min_x, min_y, max_x, max_y)`, max exclusive.
    ///
    /// Each corner is floored independently, so a room of whole-cell sides
    /// always covers exactly `width * height` cells.
    pub fn cell_bounds(&self) -> (i32, i32, i32, i32) {
        let center = self.center();
        let corners = self.local_vertices().map(|v| (center + v).floor());
        let min = corners[0];
        let max = corners[2];
        (min.x as i32, min.y as i32, max.x as i32, max.y as i32)
    }

    /// Check if a cell lies inside this room's rasterized rectangle
    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        let (min_x, min_y, max_x, max_y) = self.cell_bounds();
        x >= min_x && x < max_x && y >= min_y && y < max_y
    }

    /// Whether the continuous rectangles overlap by more than `tolerance`
    pub fn overlaps(&self, other: &RoomFootprint, tolerance: f32) -> bool {
        let delta = (self.center() - other.center()).abs();
        let reach = (self.size() + other.size()) * 0.5;
        delta.x + tolerance < reach.x && delta.y + tolerance < reach.y
    }
}

/// A footprint bound to a body and shape inside a simulation space.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedRoom<B, S> {
    pub footprint: RoomFootprint,
    pub body: B,
    pub shape: S,
    pub area: f32,
    /// Set only on the boss room, which is always last in its collection
    pub is_boss: bool,
}

impl<B, S> SimulatedRoom<B, S> {
    pub fn new(footprint: RoomFootprint, body: B, shape: S, is_boss: bool) -> Self {
        Self {
            footprint,
            body,
            shape,
            area: footprint.area(),
            is_boss,
        }
    }
}
