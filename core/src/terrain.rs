//! Contract consumed from the world map service.

use crate::{Location, MapId};

/// Terrain queries the spawning systems rely on.
///
/// Implementations answer for any coordinate, including ones outside the
/// plane's bounds, by reporting the tile as unusable.
pub trait Terrain {
    /// Ground elevation at the tile `(x, y)`.
    fn average_elevation(&self, map: MapId, x: i32, y: i32) -> i32;

    /// Reports whether an object needing `clearance` units of headroom fits at `location`.
    fn can_fit(&self, map: MapId, location: Location, clearance: u32) -> bool;

    /// Reports whether a creature may stand at `location`.
    fn can_spawn_creature(&self, map: MapId, location: Location) -> bool;

    /// Reports whether `to` is visible from `from`.
    fn line_of_sight(&self, map: MapId, from: Location, to: Location) -> bool;
}
