//! Zone registry — named spatial regions of the office
//!
//! Zones are axis-aligned tile rectangles with a designated spawn tile.
//! They are assumed non-overlapping; point lookup returns the first
//! containing zone.

use serde::{Deserialize, Serialize};

use crate::core::types::{TilePos, ZoneId};

/// Tile-rectangle bounds of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TileRect {
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }
}

/// A named region agents can occupy and move between
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub description: String,
    pub bounds: TileRect,
    /// Tile agents land on when moving to this zone
    pub spawn_tile: TilePos,
    /// Object names, used for the environment description
    pub objects: Vec<String>,
}

/// Lookup table over all zones in the world
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// The default think-tank office: boardroom, breakout spaces, five
    /// personal offices, and a podium.
    pub fn think_tank() -> Self {
        fn zone(
            id: &str,
            name: &str,
            description: &str,
            bounds: (i32, i32, i32, i32),
            spawn: (i32, i32),
            objects: &[&str],
        ) -> Zone {
            Zone {
                id: ZoneId::new(id),
                name: name.into(),
                description: description.into(),
                bounds: TileRect {
                    x: bounds.0,
                    y: bounds.1,
                    width: bounds.2,
                    height: bounds.3,
                },
                spawn_tile: TilePos::new(spawn.0, spawn.1),
                objects: objects.iter().map(|o| o.to_string()).collect(),
            }
        }

        Self::new(vec![
            zone(
                "boardroom",
                "The Boardroom",
                "Central meeting space for group debates.",
                (14, 10, 12, 8),
                (20, 14),
                &["conference table", "projector screen", "chairs"],
            ),
            zone(
                "whiteboard",
                "Whiteboard Corner",
                "Brainstorming zone for creative thinking.",
                (1, 1, 8, 7),
                (5, 4),
                &["whiteboard", "markers"],
            ),
            zone(
                "library",
                "The Library",
                "Research and reflection area.",
                (30, 1, 9, 8),
                (34, 5),
                &["bookshelves", "reading desk", "research terminal"],
            ),
            zone(
                "breakroom",
                "The Break Room",
                "Casual encounters and unplanned conversations.",
                (1, 21, 8, 8),
                (5, 25),
                &["coffee machine", "snack table", "couch"],
            ),
            zone(
                "office_visionary",
                "Office: Visionary",
                "The Visionary's private office.",
                (11, 1, 5, 5),
                (13, 3),
                &["desk", "vision board"],
            ),
            zone(
                "office_skeptic",
                "Office: Skeptic",
                "The Skeptic's private office.",
                (18, 1, 5, 5),
                (20, 3),
                &["desk", "spreadsheet monitor"],
            ),
            zone(
                "office_builder",
                "Office: Builder",
                "The Builder's private office.",
                (25, 1, 4, 5),
                (27, 3),
                &["desk", "code terminal"],
            ),
            zone(
                "office_whisperer",
                "Office: Customer Whisperer",
                "The Customer Whisperer's private office.",
                (30, 11, 5, 5),
                (32, 13),
                &["desk", "customer feedback wall"],
            ),
            zone(
                "office_devil",
                "Office: Devil's Advocate",
                "The Devil's Advocate's private office.",
                (30, 18, 5, 5),
                (32, 20),
                &["desk", "devil figurine"],
            ),
            zone(
                "podium",
                "The Podium",
                "Presentation area for formal statements.",
                (14, 22, 12, 6),
                (20, 25),
                &["lectern", "audience seats"],
            ),
        ])
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    /// Spawn tile for a zone, if the zone exists
    pub fn spawn_tile(&self, id: &ZoneId) -> Option<TilePos> {
        self.get(id).map(|z| z.spawn_tile)
    }

    /// First zone whose bounds contain the tile
    pub fn zone_at(&self, pos: TilePos) -> Option<&Zone> {
        self.zones.iter().find(|z| z.bounds.contains(pos))
    }

    pub fn all(&self) -> &[Zone] {
        &self.zones
    }

    pub fn ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.zones.iter().map(|z| &z.id)
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::think_tank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_tile_lookup() {
        let registry = ZoneRegistry::think_tank();
        let tile = registry.spawn_tile(&ZoneId::new("boardroom")).unwrap();
        assert_eq!(tile, TilePos::new(20, 14));
        assert!(registry.spawn_tile(&ZoneId::new("rooftop")).is_none());
    }

    #[test]
    fn test_zone_at_containment() {
        let registry = ZoneRegistry::think_tank();
        let zone = registry.zone_at(TilePos::new(20, 14)).unwrap();
        assert_eq!(zone.id, ZoneId::new("boardroom"));

        // Bounds are half-open: x+width is outside.
        assert!(registry.zone_at(TilePos::new(26, 14)).is_none());
    }

    #[test]
    fn test_spawn_tiles_inside_own_bounds() {
        let registry = ZoneRegistry::think_tank();
        for zone in registry.all() {
            let found = registry.zone_at(zone.spawn_tile).unwrap();
            assert_eq!(found.id, zone.id, "spawn tile of {} misplaced", zone.id);
        }
    }

    #[test]
    fn test_corridor_tiles_have_no_zone() {
        let registry = ZoneRegistry::think_tank();
        assert!(registry.zone_at(TilePos::new(10, 15)).is_none());
    }
}
