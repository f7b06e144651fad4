//! Participant stat model.
//!
//! Base stats are stored on the participant; effective stats are derived on
//! demand by folding every applicable [`ActiveEffect`](crate::state::ActiveEffect)
//! through a [`BonusStack`] per stat and clamping to [`StatBounds`].

pub mod bonus;

pub use bonus::{Bonus, BonusStack};

use crate::state::{EffectKind, ModifierScope, Participant};

/// The six profile stats of a combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub reactions: i32,
    pub speed: i32,
    pub combat: i32,
    pub toughness: i32,
    pub savvy: i32,
    pub luck: i32,
}

impl Stats {
    pub const fn new(
        reactions: i32,
        speed: i32,
        combat: i32,
        toughness: i32,
        savvy: i32,
        luck: i32,
    ) -> Self {
        Self {
            reactions,
            speed,
            combat,
            toughness,
            savvy,
            luck,
        }
    }

    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Reactions => self.reactions,
            StatKind::Speed => self.speed,
            StatKind::Combat => self.combat,
            StatKind::Toughness => self.toughness,
            StatKind::Savvy => self.savvy,
            StatKind::Luck => self.luck,
        }
    }

    fn set(&mut self, stat: StatKind, value: i32) {
        match stat {
            StatKind::Reactions => self.reactions = value,
            StatKind::Speed => self.speed = value,
            StatKind::Combat => self.combat = value,
            StatKind::Toughness => self.toughness = value,
            StatKind::Savvy => self.savvy = value,
            StatKind::Luck => self.luck = value,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatKind {
    Reactions,
    Speed,
    Combat,
    Toughness,
    Savvy,
    Luck,
}

/// Situation an effective stat is requested for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatContext {
    #[default]
    General,
    ReactionRoll,
    Combat,
}

impl StatContext {
    fn admits(self, scope: ModifierScope) -> bool {
        match scope {
            ModifierScope::Always => true,
            ModifierScope::ExceptReactionRoll => self != StatContext::ReactionRoll,
            ModifierScope::ReactionRollOnly => self == StatContext::ReactionRoll,
        }
    }
}

/// Inclusive floor/ceiling per stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatBounds {
    pub min: i32,
    pub max: i32,
}

impl StatBounds {
    pub const REACTIONS: Self = Self { min: 0, max: 6 };
    pub const SPEED: Self = Self { min: 0, max: 12 };
    pub const COMBAT: Self = Self { min: 0, max: 5 };
    pub const TOUGHNESS: Self = Self { min: 0, max: 10 };
    pub const SAVVY: Self = Self { min: 0, max: 5 };
    pub const LUCK: Self = Self { min: 0, max: 5 };

    pub const fn for_stat(stat: StatKind) -> Self {
        match stat {
            StatKind::Reactions => Self::REACTIONS,
            StatKind::Speed => Self::SPEED,
            StatKind::Combat => Self::COMBAT,
            StatKind::Toughness => Self::TOUGHNESS,
            StatKind::Savvy => Self::SAVVY,
            StatKind::Luck => Self::LUCK,
        }
    }
}

/// Computes effective stats for `participant` in `context`.
///
/// Pure: the participant is not touched and repeated calls agree.
pub fn calculate_effective_stats(participant: &Participant, context: StatContext) -> Stats {
    use strum::IntoEnumIterator;

    let base = participant.stats;
    let mut effective = base;

    for stat in StatKind::iter() {
        let mut stack = BonusStack::new();
        stack.extend(participant.active_effects.iter().filter_map(|effect| {
            match &effect.kind {
                EffectKind::StatModifier {
                    stat: target,
                    bonus,
                    scope,
                } if *target == stat && context.admits(*scope) => Some(*bonus),
                _ => None,
            }
        }));

        let bounds = StatBounds::for_stat(stat);
        effective.set(stat, stack.apply(base.get(stat), bounds.min, bounds.max));
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActiveEffect, EffectDuration, Participant, Position};

    fn trooper() -> Participant {
        Participant::character("c1", "Trooper", Position::ORIGIN, Stats::new(2, 4, 1, 4, 1, 0))
    }

    #[test]
    fn effects_fold_onto_base_stats() {
        let mut p = trooper();
        p.active_effects.push(ActiveEffect::stat(
            "booster",
            StatKind::Combat,
            Bonus::flat(1),
            EffectDuration::Rounds(1),
        ));
        p.active_effects.push(ActiveEffect::stat(
            "armor",
            StatKind::Toughness,
            Bonus::flat(1),
            EffectDuration::Permanent,
        ));

        let stats = calculate_effective_stats(&p, StatContext::General);
        assert_eq!(stats.combat, 2);
        assert_eq!(stats.toughness, 5);
        assert_eq!(stats.speed, 4);
    }

    #[test]
    fn panic_penalty_skips_reaction_rolls() {
        let mut p = trooper();
        p.active_effects.push(
            ActiveEffect::stat(
                "panic",
                StatKind::Reactions,
                Bonus::flat(-1),
                EffectDuration::Rounds(2),
            )
            .with_scope(ModifierScope::ExceptReactionRoll),
        );

        assert_eq!(
            calculate_effective_stats(&p, StatContext::ReactionRoll).reactions,
            2
        );
        assert_eq!(calculate_effective_stats(&p, StatContext::Combat).reactions, 1);
    }

    #[test]
    fn clamps_below_floor() {
        let mut p = trooper();
        p.active_effects.push(ActiveEffect::stat(
            "wound",
            StatKind::Combat,
            Bonus::flat(-5),
            EffectDuration::Permanent,
        ));
        assert_eq!(calculate_effective_stats(&p, StatContext::General).combat, 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let mut p = trooper();
        p.active_effects.push(ActiveEffect::stat(
            "stim",
            StatKind::Speed,
            Bonus::more(50),
            EffectDuration::Rounds(1),
        ));
        let first = calculate_effective_stats(&p, StatContext::Combat);
        let second = calculate_effective_stats(&p, StatContext::Combat);
        assert_eq!(first, second);
        assert_eq!(first.speed, 6);
    }
}
