use crate::config::BattleConfig;
use crate::env::{Dice, WeaponDefinition};
use crate::geometry::BattleGeometry;
use crate::state::{Participant, Position};
use crate::stats::{StatContext, calculate_effective_stats};
use crate::visibility::calculate_cover;

/// Outcome of one to-hit die.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShotRoll {
    pub natural: u32,
    pub total: i32,
    pub target_number: i32,
    pub in_cover: bool,
    pub hit: bool,
}

/// Number a shot at `target` must reach, and whether the target is in cover.
///
/// Works for hypothetical target positions as well as occupied ones.
pub fn hit_target_number(
    shooter: Position,
    target: Position,
    weapon: &WeaponDefinition,
    geometry: &BattleGeometry<'_>,
    config: &BattleConfig,
) -> (i32, bool) {
    let in_cover = calculate_cover(shooter, target, geometry);
    let beyond_short = weapon
        .range
        .short()
        .is_some_and(|short| shooter.distance(target) > short);
    (config.hit_target(in_cover, beyond_short), in_cover)
}

/// Rolls one shot. A natural 1 always misses and a natural 6 always hits.
pub fn roll_to_hit(
    shooter: &Participant,
    target: Position,
    weapon: &WeaponDefinition,
    modifier: i32,
    geometry: &BattleGeometry<'_>,
    config: &BattleConfig,
    dice: &mut Dice<'_>,
) -> ShotRoll {
    let (target_number, in_cover) =
        hit_target_number(shooter.position, target, weapon, geometry, config);
    let combat = calculate_effective_stats(shooter, StatContext::Combat).combat;

    let natural = dice.d6();
    let total = natural as i32 + combat + modifier;
    let hit = match natural {
        1 => false,
        6 => true,
        _ => total >= target_number,
    };

    ShotRoll {
        natural,
        total,
        target_number,
        in_cover,
        hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ScriptedRng, WeaponRange};
    use crate::state::{CoverHeight, GridSize, Terrain, TerrainKind};
    use crate::stats::Stats;

    fn rifle() -> WeaponDefinition {
        WeaponDefinition::new("rifle", WeaponRange::Cells(12), 1, 1)
    }

    #[test]
    fn target_number_by_cover_and_range() {
        let terrain = [Terrain::new("sandbags", TerrainKind::Barricade, Position::new(9, 0))
            .with_cover(CoverHeight::Low)];
        let geometry = BattleGeometry::new(GridSize::new(16, 4), &terrain, &[]);
        let config = BattleConfig::default();
        let origin = Position::new(0, 0);

        let target_number =
            |target: Position| hit_target_number(origin, target, &rifle(), &geometry, &config);

        assert_eq!(target_number(Position::new(4, 2)), (3, false));
        assert_eq!(target_number(Position::new(7, 3)), (5, false));
        assert_eq!(target_number(Position::new(10, 0)), (6, true));
    }

    #[test]
    fn natural_results_override_totals() {
        let geometry = BattleGeometry::new(GridSize::new(16, 4), &[], &[]);
        let config = BattleConfig::default();
        let ace =
            Participant::character("c1", "Ace", Position::new(0, 0), Stats::new(1, 4, 5, 4, 0, 0));
        let rng = ScriptedRng::new([1, 6]);
        let mut dice = Dice::new(&rng, 0, 0, 0);

        let weapon = rifle();
        let near = Position::new(2, 0);
        let miss = roll_to_hit(&ace, near, &weapon, 0, &geometry, &config, &mut dice);
        assert!(!miss.hit);
        let far = Position::new(11, 0);
        let hit = roll_to_hit(&ace, far, &weapon, -5, &geometry, &config, &mut dice);
        assert!(hit.hit);
    }
}
