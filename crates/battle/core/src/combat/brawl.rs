use std::cmp::Ordering;

use super::damage::resolve_damage;
use crate::env::{ArmoryOracle, BattleEnv, Dice, WeaponDefinition, WeaponTraits};
use crate::rules::get_effective_weapon;
use crate::state::{BattleState, LogEntry, Participant};
use crate::stats::{StatContext, calculate_effective_stats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrawlRoll {
    pub natural: u32,
    pub total: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BrawlResult {
    AttackerWins,
    DefenderWins,
    Tie,
}

/// One side's brawl total. `None` fights unarmed.
pub fn brawl_roll(
    participant: &Participant,
    weapon: Option<&WeaponDefinition>,
    dice: &mut Dice<'_>,
) -> BrawlRoll {
    let has = |traits| weapon.is_some_and(|w| w.traits.contains(traits));

    let mut natural = dice.d6();
    if natural == 1 && has(WeaponTraits::ELEGANT) {
        natural = dice.d6();
    }
    let bonus = weapon.map_or(0, WeaponDefinition::brawl_bonus);
    let clumsy = if has(WeaponTraits::CLUMSY) { 1 } else { 0 };
    let combat = calculate_effective_stats(participant, StatContext::Combat).combat;

    BrawlRoll {
        natural,
        total: natural as i32 + combat + bonus - clumsy,
    }
}

/// Carried weapon with the highest brawl bonus; the first one wins ties.
pub fn best_brawl_weapon(
    participant: &Participant,
    armory: &dyn ArmoryOracle,
) -> Option<WeaponDefinition> {
    participant
        .weapons
        .iter()
        .filter_map(|instance| get_effective_weapon(participant, &instance.instance_id, armory))
        .reduce(|best, weapon| {
            if weapon.brawl_bonus() > best.brawl_bonus() {
                weapon
            } else {
                best
            }
        })
}

/// Opposed roll between adjacent participants. Ties hurt both sides.
pub fn resolve_brawl(
    state: &mut BattleState,
    attacker: usize,
    defender: usize,
    attacker_weapon: Option<WeaponDefinition>,
    dice: &mut Dice<'_>,
    env: &BattleEnv<'_>,
) -> BrawlResult {
    let defender_weapon = env
        .armory()
        .ok()
        .and_then(|armory| best_brawl_weapon(&state.participants[defender], armory));

    let attack = brawl_roll(&state.participants[attacker], attacker_weapon.as_ref(), dice);
    let defence = brawl_roll(&state.participants[defender], defender_weapon.as_ref(), dice);
    let attacker_damage = attacker_weapon.as_ref().map_or(0, |w| w.damage);
    let defender_damage = defender_weapon.as_ref().map_or(0, |w| w.damage);

    let result = match attack.total.cmp(&defence.total) {
        Ordering::Greater => BrawlResult::AttackerWins,
        Ordering::Less => BrawlResult::DefenderWins,
        Ordering::Equal => BrawlResult::Tie,
    };

    let attacker_id = state.participants[attacker].id.clone();
    let defender_id = state.participants[defender].id.clone();
    state.push_log(
        LogEntry::new("brawl")
            .source(&attacker_id)
            .param("target", &defender_id)
            .param("attacker_total", attack.total)
            .param("defender_total", defence.total)
            .param("result", result.as_ref()),
    );

    match result {
        BrawlResult::AttackerWins => {
            resolve_damage(state, attacker, defender, attacker_damage, dice, env);
        }
        BrawlResult::DefenderWins => {
            resolve_damage(state, defender, attacker, defender_damage, dice, env);
        }
        BrawlResult::Tie => {
            resolve_damage(state, attacker, defender, attacker_damage, dice, env);
            resolve_damage(state, defender, attacker, defender_damage, dice, env);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ArmorySnapshot, ScriptedRng, WeaponRange};
    use crate::state::{GridSize, Position, WeaponInstance};
    use crate::stats::Stats;

    fn blade() -> WeaponDefinition {
        WeaponDefinition::new("blade", WeaponRange::Brawl, 0, 1)
            .with_traits(WeaponTraits::MELEE | WeaponTraits::ELEGANT)
    }

    #[test]
    fn elegant_weapons_reroll_a_one() {
        let p = Participant::character("c1", "Ada", Position::ORIGIN, Stats::new(1, 4, 1, 4, 0, 0));
        let rng = ScriptedRng::new([1, 4]);
        let mut dice = Dice::new(&rng, 0, 0, 0);
        let roll = brawl_roll(&p, Some(&blade()), &mut dice);
        assert_eq!(roll.natural, 4);
        assert_eq!(roll.total, 4 + 1 + 2);
    }

    #[test]
    fn unarmed_gets_no_bonus() {
        let p = Participant::character("c1", "Ada", Position::ORIGIN, Stats::new(1, 4, 1, 4, 0, 0));
        let rng = ScriptedRng::new([1]);
        let mut dice = Dice::new(&rng, 0, 0, 0);
        assert_eq!(brawl_roll(&p, None, &mut dice).total, 2);
    }

    #[test]
    fn best_weapon_prefers_melee() {
        let armory = ArmorySnapshot::new()
            .with_weapon(WeaponDefinition::new("rifle", WeaponRange::Cells(12), 1, 1))
            .with_weapon(blade());
        let p = Participant::character("c1", "Ada", Position::ORIGIN, Stats::default())
            .with_weapon(WeaponInstance::new("w1", "rifle"))
            .with_weapon(WeaponInstance::new("w2", "blade"));
        assert_eq!(best_brawl_weapon(&p, &armory).map(|w| w.id), Some("blade".to_owned()));
    }

    #[test]
    fn loser_takes_the_winners_damage() {
        let mut state = BattleState::new(GridSize::new(4, 4));
        state.participants = vec![
            Participant::character("c1", "Ada", Position::new(0, 0), Stats::new(1, 4, 2, 4, 0, 0)),
            Participant::enemy(
                "e1",
                "Raider",
                "brawler",
                Position::new(1, 0),
                Stats::new(1, 4, 0, 3, 0, 0),
            ),
        ];
        let armory = ArmorySnapshot::new();
        // attacker 5+2, defender 2+0, damage die 3 (3 + 1 >= 3)
        let rng = ScriptedRng::new([5, 2, 3]);
        let env = BattleEnv::empty().with_rng(&rng).with_armory(&armory);
        let mut dice = Dice::new(&rng, 0, 0, 0);

        let result = resolve_brawl(&mut state, 0, 1, Some(blade()), &mut dice, &env);
        assert_eq!(result, BrawlResult::AttackerWins);
        assert!(state.participants[1].is_casualty());
        assert!(!state.participants[0].is_casualty());
    }
}
