//! Tile-grid implementation of the terrain contract.

use std::collections::{BTreeMap, BTreeSet};

use hive_frontier_core::{Location, MapId, TileRect, Terrain, REFERENCE_MAP};

/// Height above the higher endpoint a tile must reach to block sight.
const SIGHT_HEIGHT: i32 = 15;

#[derive(Clone, Debug)]
struct Plane {
    bounds: TileRect,
    ground: i32,
    elevation: BTreeMap<(i32, i32), i32>,
    headroom: BTreeMap<(i32, i32), u32>,
    blocked: BTreeSet<(i32, i32)>,
}

impl Plane {
    fn elevation_at(&self, x: i32, y: i32) -> i32 {
        self.elevation.get(&(x, y)).copied().unwrap_or(self.ground)
    }

    fn is_open(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y) && !self.blocked.contains(&(x, y))
    }
}

/// Bounded tile planes with impassable tiles, elevation and headroom.
#[derive(Clone, Debug, Default)]
pub struct TileTerrain {
    planes: BTreeMap<MapId, Plane>,
}

impl TileTerrain {
    /// Creates terrain without any plane; every query reports unusable tiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat open plane covering the reference zones.
    #[must_use]
    pub fn reference() -> Self {
        Self::new().with_plane(REFERENCE_MAP, TileRect::new(0, 1_200, 1_024, 1_024), 0)
    }

    /// Adds a flat open plane with the provided bounds and ground elevation.
    #[must_use]
    pub fn with_plane(mut self, map: MapId, bounds: TileRect, ground: i32) -> Self {
        let _ = self.planes.insert(
            map,
            Plane {
                bounds,
                ground,
                elevation: BTreeMap::new(),
                headroom: BTreeMap::new(),
                blocked: BTreeSet::new(),
            },
        );
        self
    }

    /// Marks a tile impassable.
    pub fn block(&mut self, map: MapId, x: i32, y: i32) {
        if let Some(plane) = self.planes.get_mut(&map) {
            let _ = plane.blocked.insert((x, y));
        }
    }

    /// Overrides the ground elevation of a tile.
    pub fn set_elevation(&mut self, map: MapId, x: i32, y: i32, z: i32) {
        if let Some(plane) = self.planes.get_mut(&map) {
            let _ = plane.elevation.insert((x, y), z);
        }
    }

    /// Limits the vertical space available above a tile.
    pub fn set_headroom(&mut self, map: MapId, x: i32, y: i32, headroom: u32) {
        if let Some(plane) = self.planes.get_mut(&map) {
            let _ = plane.headroom.insert((x, y), headroom);
        }
    }
}

impl Terrain for TileTerrain {
    fn average_elevation(&self, map: MapId, x: i32, y: i32) -> i32 {
        self.planes
            .get(&map)
            .map_or(0, |plane| plane.elevation_at(x, y))
    }

    fn can_fit(&self, map: MapId, location: Location, clearance: u32) -> bool {
        let Some(plane) = self.planes.get(&map) else {
            return false;
        };
        let (x, y) = (location.x(), location.y());
        plane.is_open(x, y)
            && plane
                .headroom
                .get(&(x, y))
                .map_or(true, |headroom| *headroom >= clearance)
    }

    fn can_spawn_creature(&self, map: MapId, location: Location) -> bool {
        self.planes
            .get(&map)
            .is_some_and(|plane| plane.is_open(location.x(), location.y()))
    }

    fn line_of_sight(&self, map: MapId, from: Location, to: Location) -> bool {
        let Some(plane) = self.planes.get(&map) else {
            return false;
        };
        if !plane.bounds.contains(from.x(), from.y()) || !plane.bounds.contains(to.x(), to.y()) {
            return false;
        }

        let horizon = from.z().max(to.z()).saturating_add(SIGHT_HEIGHT);
        line_between(from, to)
            .into_iter()
            .all(|(x, y)| !plane.blocked.contains(&(x, y)) && plane.elevation_at(x, y) <= horizon)
    }
}

/// Tiles strictly between two locations along a Bresenham line.
fn line_between(from: Location, to: Location) -> Vec<(i32, i32)> {
    let (mut x, mut y) = (from.x(), from.y());
    let (end_x, end_y) = (to.x(), to.y());
    let dx = (end_x - x).abs();
    let dy = -(end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut error = dx + dy;
    let mut tiles = Vec::new();

    while (x, y) != (end_x, end_y) {
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
        if (x, y) != (end_x, end_y) {
            tiles.push((x, y));
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: MapId = MapId::new(1);

    fn terrain() -> TileTerrain {
        TileTerrain::new().with_plane(MAP, TileRect::new(0, 0, 20, 20), 0)
    }

    #[test]
    fn unknown_planes_are_unusable() {
        let terrain = TileTerrain::new();
        let spot = Location::new(1, 1, 0);
        assert!(!terrain.can_fit(MAP, spot, 16));
        assert!(!terrain.can_spawn_creature(MAP, spot));
        assert!(!terrain.line_of_sight(MAP, spot, spot));
        assert_eq!(terrain.average_elevation(MAP, 1, 1), 0);
    }

    #[test]
    fn blocked_and_out_of_bounds_tiles_reject_creatures() {
        let mut terrain = terrain();
        terrain.block(MAP, 3, 3);
        assert!(!terrain.can_spawn_creature(MAP, Location::new(3, 3, 0)));
        assert!(!terrain.can_spawn_creature(MAP, Location::new(20, 3, 0)));
        assert!(terrain.can_spawn_creature(MAP, Location::new(4, 3, 0)));
    }

    #[test]
    fn headroom_limits_fitting() {
        let mut terrain = terrain();
        terrain.set_headroom(MAP, 5, 5, 10);
        assert!(!terrain.can_fit(MAP, Location::new(5, 5, 0), 16));
        assert!(terrain.can_fit(MAP, Location::new(5, 5, 0), 8));
        assert!(terrain.can_fit(MAP, Location::new(6, 5, 0), 16));
    }

    #[test]
    fn walls_and_ridges_block_sight() {
        let mut terrain = terrain();
        let from = Location::new(2, 5, 0);
        let to = Location::new(8, 5, 0);
        assert!(terrain.line_of_sight(MAP, from, to));

        terrain.block(MAP, 5, 5);
        assert!(!terrain.line_of_sight(MAP, from, to));

        let mut ridge = self::terrain();
        ridge.set_elevation(MAP, 5, 5, 40);
        assert!(!ridge.line_of_sight(MAP, from, to));
        assert_eq!(ridge.average_elevation(MAP, 5, 5), 40);
    }

    #[test]
    fn line_excludes_endpoints() {
        let tiles = line_between(Location::new(0, 0, 0), Location::new(3, 0, 0));
        assert_eq!(tiles, vec![(1, 0), (2, 0)]);
        assert!(line_between(Location::new(4, 4, 0), Location::new(4, 4, 0)).is_empty());
    }
}
