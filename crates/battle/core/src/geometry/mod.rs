//! Grid geometry: distance, passability, pathfinding and straight lines.
//!
//! Every query works on a borrowed [`BattleGeometry`] view so the same code
//! serves the live state, hypothetical previews and the AI.

mod line;
mod path;

pub use line::line_path;
pub use path::{NEIGHBORS, ReachableCells, find_path, find_reachable_cells};

use crate::state::{GridSize, Participant, ParticipantId, Position, Terrain};

/// Chebyshev distance. `distance(a, b) <= 1` means adjacent.
pub fn distance(a: Position, b: Position) -> u32 {
    a.distance(b)
}

/// Rectangular containment test.
pub fn is_point_in_terrain(position: Position, terrain: &Terrain) -> bool {
    terrain.contains(position)
}

/// Read-only view of everything that decides passability and sight.
#[derive(Clone, Copy, Debug)]
pub struct BattleGeometry<'a> {
    pub grid: GridSize,
    pub terrain: &'a [Terrain],
    pub participants: &'a [Participant],
}

impl<'a> BattleGeometry<'a> {
    pub fn new(grid: GridSize, terrain: &'a [Terrain], participants: &'a [Participant]) -> Self {
        Self {
            grid,
            terrain,
            participants,
        }
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        self.grid.contains(position)
    }

    /// True when impassable, non-door terrain covers the cell.
    pub fn is_blocked_by_terrain(&self, position: Position) -> bool {
        self.terrain
            .iter()
            .any(|t| t.blocks_movement() && t.contains(position))
    }

    /// Living participant standing on `position`, other than `exclude`.
    pub fn occupant(
        &self,
        position: Position,
        exclude: Option<&ParticipantId>,
    ) -> Option<&'a Participant> {
        self.participants.iter().find(|p| {
            p.position == position && !p.is_casualty() && Some(&p.id) != exclude
        })
    }

    pub fn is_occupied(&self, position: Position, exclude: Option<&ParticipantId>) -> bool {
        self.occupant(position, exclude).is_some()
    }

    /// Whether a participant other than `exclude` could end a move on `position`.
    pub fn is_cell_walkable(&self, position: Position, exclude: Option<&ParticipantId>) -> bool {
        self.in_bounds(position)
            && !self.is_occupied(position, exclude)
            && !self.is_blocked_by_terrain(position)
    }

    pub(crate) fn is_passable(
        &self,
        position: Position,
        exclude: Option<&ParticipantId>,
        avoid_occupied: bool,
    ) -> bool {
        self.in_bounds(position)
            && !self.is_blocked_by_terrain(position)
            && (!avoid_occupied || !self.is_occupied(position, exclude))
    }
}
