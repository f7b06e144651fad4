//! Line of sight and cover.
//!
//! Both queries take plain positions, so they can be asked for hypothetical
//! ("ghost") positions as well as real occupants.

use crate::geometry::{BattleGeometry, line_path};
use crate::state::Position;

/// True unless an occluding terrain footprint crosses the sight line.
///
/// The observer's and target's own cells never occlude.
pub fn has_line_of_sight(
    observer: Position,
    target: Position,
    geometry: &BattleGeometry<'_>,
) -> bool {
    if observer == target {
        return true;
    }

    let line = line_path(observer, target);
    let inner = &line[1..line.len() - 1];

    !geometry.terrain.iter().filter(|t| t.blocks_sight()).any(|terrain| {
        inner.iter().any(|cell| terrain.contains(*cell))
    })
}

/// True when cover-providing terrain shields `defender` from `attacker`.
///
/// Cover is granted by a cover piece the defender stands in, or by one that
/// the sight line crosses within one cell of the defender (the attacker-facing
/// side). Cover pieces do not have to block sight.
pub fn calculate_cover(
    attacker: Position,
    defender: Position,
    geometry: &BattleGeometry<'_>,
) -> bool {
    if attacker == defender {
        return false;
    }

    let line = line_path(attacker, defender);
    let approach: Vec<Position> = line[1..line.len() - 1]
        .iter()
        .copied()
        .filter(|cell| cell.distance(defender) <= 1)
        .collect();

    geometry
        .terrain
        .iter()
        .filter(|t| t.provides_cover())
        .any(|terrain| {
            (terrain.contains(defender) && !terrain.contains(attacker))
                || approach.iter().any(|cell| terrain.contains(*cell))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CoverHeight, GridSize, Terrain, TerrainKind};

    fn geometry(terrain: &[Terrain]) -> BattleGeometry<'_> {
        BattleGeometry::new(GridSize::new(12, 12), terrain, &[])
    }

    #[test]
    fn no_terrain_means_clear_sight_and_no_cover() {
        let g = geometry(&[]);
        let a = Position::new(0, 0);
        let b = Position::new(7, 3);
        assert!(has_line_of_sight(a, b, &g));
        assert!(!calculate_cover(a, b, &g));
    }

    #[test]
    fn same_cell_sees_without_cover() {
        let terrain = [Terrain::new("bush", TerrainKind::Vegetation, Position::new(2, 2))
            .with_cover(CoverHeight::Low)];
        let g = geometry(&terrain);
        let p = Position::new(2, 2);
        assert!(has_line_of_sight(p, p, &g));
        assert!(!calculate_cover(p, p, &g));
    }

    #[test]
    fn wall_blocks_sight() {
        let terrain = [Terrain::new("wall", TerrainKind::Wall, Position::new(3, 0))
            .with_size(1, 6)
            .impassable()];
        let g = geometry(&terrain);
        assert!(!has_line_of_sight(Position::new(0, 2), Position::new(6, 2), &g));
        assert!(has_line_of_sight(Position::new(0, 8), Position::new(6, 8), &g));
    }

    #[test]
    fn doors_and_dressing_do_not_block_sight() {
        let terrain = [
            Terrain::new("door", TerrainKind::Door, Position::new(3, 2)).impassable(),
            Terrain::new("desk", TerrainKind::InteriorDressing, Position::new(5, 2)).impassable(),
        ];
        let g = geometry(&terrain);
        assert!(has_line_of_sight(Position::new(0, 2), Position::new(8, 2), &g));
    }

    #[test]
    fn low_wall_next_to_defender_gives_cover_without_blocking() {
        let terrain = [Terrain::new("sandbags", TerrainKind::Barricade, Position::new(5, 2))
            .with_cover(CoverHeight::Low)];
        let g = geometry(&terrain);
        let attacker = Position::new(0, 2);
        let defender = Position::new(6, 2);

        assert!(has_line_of_sight(attacker, defender, &g));
        assert!(calculate_cover(attacker, defender, &g));
        // Shooting from the other side, the sandbags are behind the defender.
        assert!(!calculate_cover(Position::new(11, 2), defender, &g));
    }

    #[test]
    fn distant_cover_piece_does_not_count() {
        let terrain = [Terrain::new("crates", TerrainKind::Crates, Position::new(2, 2))
            .with_cover(CoverHeight::High)];
        let g = geometry(&terrain);
        assert!(!calculate_cover(Position::new(0, 2), Position::new(8, 2), &g));
    }

    #[test]
    fn standing_inside_vegetation_is_cover() {
        let terrain = [Terrain::new("scrub", TerrainKind::Vegetation, Position::new(6, 6))
            .with_size(2, 2)
            .with_cover(CoverHeight::Low)];
        let g = geometry(&terrain);
        assert!(calculate_cover(Position::new(0, 0), Position::new(7, 7), &g));
    }
}
