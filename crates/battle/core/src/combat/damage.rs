use tracing::debug;

use crate::env::{ArmoryOracle, BattleEnv, Dice};
use crate::state::{ActiveEffect, BattleState, LogEntry, Participant, SpecialAbility};
use crate::stats::{StatContext, calculate_effective_stats};

/// What a landed hit did to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum HitOutcome {
    Saved,
    Casualty,
    Dazed,
    Stunned,
}

/// Best saving throw from armor or screen. Lower is better.
pub fn armor_save(participant: &Participant, armory: &dyn ArmoryOracle) -> Option<u32> {
    [participant.armor.as_deref(), participant.screen.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(|id| armory.armor(id))
        .filter_map(|armor| armor.save)
        .min()
}

/// Resolves a landed hit of `damage` from `attacker` on `target`.
///
/// Save first, then the damage die against effective toughness. Survivors of
/// a terrifying attacker are left panicked.
pub fn resolve_damage(
    state: &mut BattleState,
    attacker: usize,
    target: usize,
    damage: i32,
    dice: &mut Dice<'_>,
    env: &BattleEnv<'_>,
) -> HitOutcome {
    let victim = &state.participants[target];
    let victim_id = victim.id.clone();

    let save = env.armory().ok().and_then(|armory| armor_save(victim, armory));
    if let Some(save) = save {
        let roll = dice.d6();
        if roll >= save {
            state.push_log(
                LogEntry::new("hit_saved")
                    .source(&victim_id)
                    .param("roll", roll)
                    .param("save", save),
            );
            return HitOutcome::Saved;
        }
    }

    let toughness = calculate_effective_stats(victim, StatContext::Combat).toughness;
    let roll = dice.d6();
    let total = roll as i32 + damage;
    let outcome = if roll == 6 || total >= toughness {
        HitOutcome::Casualty
    } else if roll == 1 {
        HitOutcome::Dazed
    } else {
        HitOutcome::Stunned
    };

    let victim = &mut state.participants[target];
    match outcome {
        HitOutcome::Casualty => victim.mark_casualty(),
        HitOutcome::Dazed => victim.daze(),
        HitOutcome::Stunned => victim.add_stun(),
        HitOutcome::Saved => {}
    }
    debug!(victim = %victim_id, roll, total, toughness, outcome = %outcome, "damage resolved");
    state.push_log(
        LogEntry::new(outcome.as_ref())
            .source(&victim_id)
            .param("roll", roll)
            .param("total", total)
            .param("toughness", toughness),
    );

    if outcome != HitOutcome::Casualty {
        terrify(state, attacker, target, env);
    }
    outcome
}

fn terrify(state: &mut BattleState, attacker: usize, target: usize, env: &BattleEnv<'_>) {
    let source = &state.participants[attacker];
    if !source.has_ability(SpecialAbility::Terrifying) {
        return;
    }
    let (source_name, source_position) = (source.name.clone(), source.position);

    let victim = &mut state.participants[target];
    if victim.has_ability(SpecialAbility::Fearless)
        || victim.active_effects.terrified_by().is_some()
    {
        return;
    }
    victim.active_effects.push(ActiveEffect::terrifying(
        source_name.clone(),
        source_position,
        env.config().terrified_rounds,
    ));
    let victim_id = victim.id.clone();
    state.push_log(
        LogEntry::new("terrified")
            .source(&victim_id)
            .param("by", source_name),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ArmorDefinition, ArmorySnapshot, ScriptedRng};
    use crate::state::{GridSize, ParticipantStatus, Position};
    use crate::stats::Stats;

    fn duel() -> BattleState {
        let mut state = BattleState::new(GridSize::new(6, 6));
        state.participants = vec![
            Participant::enemy(
                "e1",
                "Horror",
                "beast",
                Position::new(0, 0),
                Stats::new(1, 4, 1, 4, 0, 0),
            )
            .with_ability(SpecialAbility::Terrifying),
            Participant::character("c1", "Ada", Position::new(1, 0), Stats::new(1, 4, 1, 4, 0, 0)),
        ];
        state
    }

    #[test]
    fn toughness_decides_casualty() {
        let mut state = duel();
        let rng = ScriptedRng::new([3]);
        let env = BattleEnv::empty().with_rng(&rng);
        let mut dice = Dice::new(&rng, 0, 0, 0);
        // 3 + 1 >= 4
        assert_eq!(resolve_damage(&mut state, 0, 1, 1, &mut dice, &env), HitOutcome::Casualty);
        assert!(state.participants[1].is_casualty());
        assert!(state.log.contains_key("casualty"));
    }

    #[test]
    fn survivors_of_a_terrifying_attacker_panic() {
        let mut state = duel();
        let rng = ScriptedRng::new([2]);
        let env = BattleEnv::empty().with_rng(&rng);
        let mut dice = Dice::new(&rng, 0, 0, 0);

        assert_eq!(resolve_damage(&mut state, 0, 1, 0, &mut dice, &env), HitOutcome::Stunned);
        let victim = &state.participants[1];
        assert_eq!(victim.status, ParticipantStatus::Stunned);
        assert_eq!(victim.active_effects.terrified_by(), Some(Position::new(0, 0)));
    }

    #[test]
    fn natural_one_dazes() {
        let mut state = duel();
        state.participants[0].special_abilities.clear();
        let rng = ScriptedRng::new([1]);
        let env = BattleEnv::empty().with_rng(&rng);
        let mut dice = Dice::new(&rng, 0, 0, 0);

        assert_eq!(resolve_damage(&mut state, 0, 1, 0, &mut dice, &env), HitOutcome::Dazed);
        assert_eq!(state.participants[1].status, ParticipantStatus::Dazed);
        assert!(state.participants[1].active_effects.is_empty());
    }

    #[test]
    fn armor_save_negates() {
        let mut state = duel();
        state.participants[1].armor = Some("vest".into());
        let armory = ArmorySnapshot::new().with_armor(ArmorDefinition {
            id: "vest".into(),
            save: Some(5),
            toughness_bonus: 0,
            speed_bonus: 0,
        });
        let rng = ScriptedRng::new([5]);
        let env = BattleEnv::empty().with_rng(&rng).with_armory(&armory);
        let mut dice = Dice::new(&rng, 0, 0, 0);

        assert_eq!(resolve_damage(&mut state, 0, 1, 3, &mut dice, &env), HitOutcome::Saved);
        assert_eq!(state.participants[1].status, ParticipantStatus::Active);
    }
}
