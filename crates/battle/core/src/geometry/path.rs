//! Breadth-first search over the 8-connected grid.
//!
//! Steps cost the same in every direction, so BFS yields shortest paths.
//! Neighbors are expanded in the fixed [`NEIGHBORS`] order, which makes the
//! chosen path stable for identical inputs.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::BattleGeometry;
use crate::state::{ParticipantId, Position};

/// Expansion order: orthogonal first, then diagonals.
pub const NEIGHBORS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Reachable cells mapped to the number of steps needed to reach them.
pub type ReachableCells = BTreeMap<Position, u32>;

/// Shortest path from `start` to `goal`, excluding `start`.
///
/// Returns `None` when the goal cannot be reached. `exclude` is the mover,
/// whose own cell never counts as occupied.
pub fn find_path(
    start: Position,
    goal: Position,
    geometry: &BattleGeometry<'_>,
    exclude: Option<&ParticipantId>,
    avoid_occupied: bool,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !geometry.is_passable(goal, exclude, avoid_occupied) {
        return None;
    }

    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    came_from.insert(start, start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }

        for (dx, dy) in NEIGHBORS {
            let next = current.offset(dx, dy);
            if came_from.contains_key(&next) {
                continue;
            }
            if !geometry.is_passable(next, exclude, avoid_occupied) {
                continue;
            }
            came_from.insert(next, current);
            queue.push_back(next);
        }
    }

    None
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Every cell reachable from `start` within `budget` steps, with its cost.
///
/// The start cell is never included and cells held by living participants
/// other than `exclude` are neither entered nor crossed.
pub fn find_reachable_cells(
    start: Position,
    budget: u32,
    geometry: &BattleGeometry<'_>,
    exclude: Option<&ParticipantId>,
) -> ReachableCells {
    let mut reachable = ReachableCells::new();
    if budget == 0 {
        return reachable;
    }

    let mut visited: HashMap<Position, u32> = HashMap::from([(start, 0)]);
    let mut queue = VecDeque::from([(start, 0u32)]);

    while let Some((current, cost)) = queue.pop_front() {
        if cost == budget {
            continue;
        }
        for (dx, dy) in NEIGHBORS {
            let next = current.offset(dx, dy);
            if visited.contains_key(&next) {
                continue;
            }
            if !geometry.is_passable(next, exclude, true) {
                continue;
            }
            visited.insert(next, cost + 1);
            reachable.insert(next, cost + 1);
            queue.push_back((next, cost + 1));
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GridSize, Participant, Terrain, TerrainKind};
    use crate::stats::Stats;

    fn open(grid: GridSize) -> BattleGeometry<'static> {
        BattleGeometry::new(grid, &[], &[])
    }

    #[test]
    fn straight_path_has_distance_length() {
        let geometry = open(GridSize::new(10, 10));
        let path = find_path(
            Position::new(0, 0),
            Position::new(6, 3),
            &geometry,
            None,
            true,
        )
        .unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&Position::new(6, 3)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
    }

    #[test]
    fn same_cell_path_is_empty() {
        let geometry = open(GridSize::new(4, 4));
        let start = Position::new(1, 1);
        assert_eq!(find_path(start, start, &geometry, None, true), Some(Vec::new()));
    }

    #[test]
    fn path_goes_around_walls() {
        let terrain = vec![
            Terrain::new("wall", TerrainKind::Wall, Position::new(3, 0))
                .with_size(1, 4)
                .impassable(),
        ];
        let geometry = BattleGeometry::new(GridSize::new(6, 6), &terrain, &[]);
        let path = find_path(
            Position::new(0, 0),
            Position::new(5, 0),
            &geometry,
            None,
            true,
        )
        .unwrap();
        assert!(path.iter().all(|p| !terrain[0].contains(*p)));
        assert!(path.len() > 5);
    }

    #[test]
    fn sealed_goal_is_unreachable() {
        let terrain = vec![
            Terrain::new("box", TerrainKind::Building, Position::new(2, 2))
                .with_size(3, 3)
                .impassable(),
        ];
        let geometry = BattleGeometry::new(GridSize::new(8, 8), &terrain, &[]);
        assert_eq!(
            find_path(Position::new(0, 0), Position::new(3, 3), &geometry, None, true),
            None
        );
    }

    #[test]
    fn occupied_goal_only_blocks_when_avoiding() {
        let participants = vec![Participant::character(
            "x",
            "X",
            Position::new(2, 0),
            Stats::default(),
        )];
        let geometry = BattleGeometry::new(GridSize::new(5, 5), &[], &participants);
        let goal = Position::new(2, 0);
        assert!(find_path(Position::ORIGIN, goal, &geometry, None, true).is_none());
        assert!(find_path(Position::ORIGIN, goal, &geometry, None, false).is_some());
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let geometry = open(GridSize::new(12, 12));
        let a = find_path(Position::new(1, 1), Position::new(9, 4), &geometry, None, true);
        let b = find_path(Position::new(1, 1), Position::new(9, 4), &geometry, None, true);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_budget_is_empty() {
        let geometry = open(GridSize::new(5, 5));
        assert!(find_reachable_cells(Position::new(2, 2), 0, &geometry, None).is_empty());
    }

    #[test]
    fn reachable_costs_match_distance_on_open_ground() {
        let geometry = open(GridSize::new(9, 9));
        let start = Position::new(4, 4);
        let cells = find_reachable_cells(start, 2, &geometry, None);
        assert_eq!(cells.len(), 24);
        assert!(!cells.contains_key(&start));
        for (cell, cost) in &cells {
            assert_eq!(*cost, start.distance(*cell));
        }
    }

    #[test]
    fn reachable_excludes_other_occupants_but_not_mover() {
        let participants = vec![
            Participant::character("me", "Me", Position::new(2, 2), Stats::default()),
            Participant::character("ally", "Ally", Position::new(3, 2), Stats::default()),
        ];
        let geometry = BattleGeometry::new(GridSize::new(6, 6), &[], &participants);
        let me = ParticipantId::new("me");
        let cells = find_reachable_cells(Position::new(2, 2), 1, &geometry, Some(&me));
        assert!(!cells.contains_key(&Position::new(3, 2)));
        assert!(!cells.contains_key(&Position::new(2, 2)));
        assert_eq!(cells.len(), 7);
    }
}
