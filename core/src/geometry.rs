//! World-plane coordinates and rectangles.

use serde::{Deserialize, Serialize};

/// Identifier of a world-plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(u8);

impl MapId {
    /// Non-simulated staging plane; entities parked here never act.
    pub const INTERNAL: Self = Self(0x7f);

    /// Creates a new world-plane identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether entities on this plane take part in the simulation.
    #[must_use]
    pub const fn is_simulated(&self) -> bool {
        self.0 != Self::INTERNAL.0
    }
}

/// Tile position on a world-plane with its elevation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    x: i32,
    y: i32,
    z: i32,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal tile coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical tile coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Elevation of the location.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Reports whether `other` lies within `range` tiles on both axes.
    ///
    /// Elevation is ignored, matching how proximity works for movement
    /// triggers.
    #[must_use]
    pub fn in_range(self, other: Location, range: u32) -> bool {
        self.x.abs_diff(other.x) <= range && self.y.abs_diff(other.y) <= range
    }
}

/// Axis-aligned rectangle of tiles, origin inclusive and far edge exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl TileRect {
    /// Creates a rectangle from its origin and dimensions.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Column of the upper-left corner.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the upper-left corner.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the tile at `(x, y)` lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let dx = i64::from(x) - i64::from(self.x);
        let dy = i64::from(y) - i64::from(self.y);
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }

    /// Reports whether the rectangle covers no tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
