//! Grid, reachability and sight properties on small hand-built boards.

use battle_core::config::BattleConfig;
use battle_core::geometry::{distance, find_path, find_reachable_cells};
use battle_core::rules::{is_opponent, movement_options};
use battle_core::state::{
    ActiveEffect, BattleState, GridSize, MultiplayerRole, Participant, Position, Terrain,
    TerrainKind,
};
use battle_core::stats::Stats;
use battle_core::visibility::has_line_of_sight;

fn stats(speed: i32) -> Stats {
    Stats::new(1, speed, 1, 4, 0, 0)
}

fn all_cells(grid: GridSize) -> Vec<Position> {
    (0..grid.height as i32)
        .flat_map(|y| (0..grid.width as i32).map(move |x| Position::new(x, y)))
        .collect()
}

#[test]
fn open_ground_sees_everything_and_paths_are_shortest() {
    let state = BattleState::new(GridSize::new(6, 6));
    let geometry = state.geometry();
    let cells = all_cells(state.grid);

    for &a in &cells {
        for &b in &cells {
            assert!(has_line_of_sight(a, b, &geometry), "{a} should see {b}");
            let path = find_path(a, b, &geometry, None, true).expect("open grid");
            assert_eq!(path.len() as u32, distance(a, b), "path {a} -> {b}");
        }
    }
}

#[test]
fn walls_block_sight() {
    let mut state = BattleState::new(GridSize::new(7, 3));
    state.terrain.push(
        Terrain::new("wall", TerrainKind::Wall, Position::new(3, 0))
            .with_size(1, 3)
            .impassable(),
    );
    let geometry = state.geometry();

    assert!(!has_line_of_sight(Position::new(0, 1), Position::new(6, 1), &geometry));
    assert!(has_line_of_sight(Position::new(0, 1), Position::new(2, 2), &geometry));
}

#[test]
fn zero_budget_reaches_nothing() {
    let state = BattleState::new(GridSize::new(5, 5));
    let cells = find_reachable_cells(Position::new(2, 2), 0, &state.geometry(), None);
    assert!(cells.is_empty());
}

#[test]
fn reachable_cells_skip_start_and_occupied_cells() {
    let mut state = BattleState::new(GridSize::new(6, 6));
    state.participants = vec![
        Participant::character("c1", "Ada", Position::new(2, 2), stats(4)),
        Participant::character("c2", "Bo", Position::new(3, 2), stats(4)),
        Participant::enemy("e1", "Raider", "aggressive", Position::new(1, 1), stats(4)),
    ];
    state.participants[2].mark_casualty();
    let mover = &state.participants[0];

    let cells = find_reachable_cells(mover.position, 3, &state.geometry(), Some(&mover.id));
    assert!(!cells.contains_key(&Position::new(2, 2)));
    assert!(!cells.contains_key(&Position::new(3, 2)));
    // Casualties do not occupy their cell.
    assert_eq!(cells.get(&Position::new(1, 1)), Some(&1));
}

#[test]
fn speed_five_from_the_corner() {
    let mut state = BattleState::new(GridSize::new(10, 10));
    state.participants = vec![Participant::character("c1", "Ada", Position::ORIGIN, stats(5))];
    let config = BattleConfig::default();

    let cells = movement_options(&state, &state.participants[0], false, &config);
    // Every cell of the 6x6 corner block except the start.
    assert_eq!(cells.len(), 35);
    assert!(cells.contains_key(&Position::new(5, 5)));
    assert!(!cells.contains_key(&Position::new(6, 6)));
    assert!(!cells.contains_key(&Position::ORIGIN));
    assert!(cells.values().all(|&cost| (1..=5).contains(&cost)));
}

#[test]
fn dash_doubles_the_budget() {
    let mut state = BattleState::new(GridSize::new(12, 3));
    state.participants = vec![Participant::character("c1", "Ada", Position::ORIGIN, stats(4))];
    let config = BattleConfig::default();

    let cells = movement_options(&state, &state.participants[0], true, &config);
    assert!(cells.contains_key(&Position::new(8, 0)));
    assert!(!cells.contains_key(&Position::new(9, 0)));
}

#[test]
fn terror_collapses_movement_to_the_flee_cell() {
    let mut state = BattleState::new(GridSize::new(10, 10));
    state.participants = vec![Participant::character("c1", "Ada", Position::new(5, 5), stats(6))];
    state.participants[0]
        .active_effects
        .push(ActiveEffect::terrifying("Horror", Position::new(5, 4), 2));
    let config = BattleConfig::default();

    let cells = movement_options(&state, &state.participants[0], false, &config);
    assert!(cells.len() <= 1);
    assert_eq!(cells.keys().next(), Some(&Position::new(2, 8)));
}

#[test]
fn opponents_follow_type_or_prefix() {
    let character = Participant::character("c1", "Ada", Position::new(0, 0), stats(4));
    let enemy = Participant::enemy("e1", "Raider", "aggressive", Position::new(1, 0), stats(4));
    assert!(is_opponent(&character, &enemy, None));
    assert!(is_opponent(&enemy, &character, None));

    let host_a = Participant::character("host_a", "Ada", Position::new(0, 0), stats(4));
    let host_b = Participant::character("host_b", "Bo", Position::new(1, 0), stats(4));
    assert!(!is_opponent(&host_a, &host_b, Some(MultiplayerRole::Host)));
    assert!(!is_opponent(&host_a, &host_b, Some(MultiplayerRole::Guest)));
}
