//! Static terrain footprints placed on the battle grid.

use super::Position;

/// Terrain archetype. Decides movement, sight and cover behaviour together
/// with the `impassable` flag and [`CoverHeight`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TerrainKind {
    Building,
    Wall,
    Rocks,
    Barricade,
    Crates,
    Vegetation,
    /// Passable and transparent even when flagged impassable.
    Door,
    /// Furniture and clutter inside structures. Never occludes.
    InteriorDressing,
    /// Load-bearing walls of an interior layout. Occludes like a wall.
    InteriorStructure,
}

/// Height class used by the cover rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CoverHeight {
    /// Provides no cover at all.
    #[default]
    Flat,
    Low,
    High,
}

/// Rectangular terrain piece. Static for the lifetime of a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Terrain {
    pub id: String,
    pub kind: TerrainKind,
    pub position: Position,
    pub width: u32,
    pub height: u32,
    pub impassable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cover: CoverHeight,
}

impl Terrain {
    pub fn new(id: impl Into<String>, kind: TerrainKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            width: 1,
            height: 1,
            impassable: false,
            cover: CoverHeight::Flat,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn impassable(mut self) -> Self {
        self.impassable = true;
        self
    }

    pub fn with_cover(mut self, cover: CoverHeight) -> Self {
        self.cover = cover;
        self
    }

    /// Rectangular containment test.
    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.position.x
            && position.y >= self.position.y
            && position.x < self.position.x + self.width as i32
            && position.y < self.position.y + self.height as i32
    }

    pub fn blocks_movement(&self) -> bool {
        self.impassable && self.kind != TerrainKind::Door
    }

    pub fn blocks_sight(&self) -> bool {
        self.blocks_movement() && self.kind != TerrainKind::InteriorDressing
    }

    pub fn provides_cover(&self) -> bool {
        self.cover != CoverHeight::Flat && self.kind != TerrainKind::Door
    }

    /// Chebyshev distance from a cell to the nearest cell of the footprint.
    pub fn distance_to(&self, position: Position) -> u32 {
        let max_x = self.position.x + self.width as i32 - 1;
        let max_y = self.position.y + self.height as i32 - 1;
        let nearest = Position::new(
            position.x.clamp(self.position.x, max_x),
            position.y.clamp(self.position.y, max_y),
        );
        nearest.distance(position)
    }
}
