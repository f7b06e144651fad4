//! Timed and persistent effects carried by participants.
//!
//! Effects are a typed list folded by [`crate::stats::calculate_effective_stats`]
//! and inspected by the action rules through the helpers on [`ActiveEffects`].

use super::Position;
use crate::stats::{Bonus, StatKind};

/// Source id used by fear-causing enemies.
pub const TERRIFYING: &str = "terrifying";

/// How long an effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    Permanent,
    Rounds(u32),
}

impl EffectDuration {
    /// Converts the wire encoding (`-1` permanent, `N` rounds).
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            Self::Permanent
        } else {
            Self::Rounds(raw as u32)
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Permanent => -1,
            Self::Rounds(n) => n as i32,
        }
    }
}

/// Where a stat modifier applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierScope {
    #[default]
    Always,
    /// Skipped for reaction rolls (e.g. panic only hurts fighting).
    ExceptReactionRoll,
    /// Only counted for reaction rolls.
    ReactionRollOnly,
}

/// Typed effect payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    StatModifier {
        stat: StatKind,
        bonus: Bonus,
        scope: ModifierScope,
    },
    /// Forces flee-only movement away from `source`.
    Terrified { source: Position },
    /// Pinned down: only panic fire is possible.
    Suppressed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub source_id: String,
    pub source_name: String,
    pub duration: EffectDuration,
    pub kind: EffectKind,
}

impl ActiveEffect {
    pub fn new(
        source_id: impl Into<String>,
        source_name: impl Into<String>,
        duration: EffectDuration,
        kind: EffectKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_name: source_name.into(),
            duration,
            kind,
        }
    }

    pub fn stat(
        source_id: impl Into<String>,
        stat: StatKind,
        bonus: Bonus,
        duration: EffectDuration,
    ) -> Self {
        let source_id = source_id.into();
        Self::new(
            source_id.clone(),
            source_id,
            duration,
            EffectKind::StatModifier {
                stat,
                bonus,
                scope: ModifierScope::Always,
            },
        )
    }

    pub fn terrifying(source_name: impl Into<String>, source: Position, rounds: u32) -> Self {
        Self::new(
            TERRIFYING,
            source_name,
            EffectDuration::Rounds(rounds),
            EffectKind::Terrified { source },
        )
    }

    pub fn suppressed(source_name: impl Into<String>, rounds: u32) -> Self {
        Self::new(
            "suppressed",
            source_name,
            EffectDuration::Rounds(rounds),
            EffectKind::Suppressed,
        )
    }

    pub fn with_scope(mut self, new_scope: ModifierScope) -> Self {
        if let EffectKind::StatModifier { scope, .. } = &mut self.kind {
            *scope = new_scope;
        }
        self
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self.duration, EffectDuration::Permanent)
    }
}

/// Ordered effect list of a participant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActiveEffects {
    effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: ActiveEffect) {
        self.effects.push(effect);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn remove_source(&mut self, source_id: &str) {
        self.effects.retain(|effect| effect.source_id != source_id);
    }

    pub fn retain(&mut self, keep: impl FnMut(&ActiveEffect) -> bool) {
        self.effects.retain(keep);
    }

    /// Fear source of the first terrifying effect, if any.
    pub fn terrified_by(&self) -> Option<Position> {
        self.effects.iter().find_map(|effect| match effect.kind {
            EffectKind::Terrified { source } => Some(source),
            _ => None,
        })
    }

    pub fn is_suppressed(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect.kind, EffectKind::Suppressed))
    }

    /// Decrements timed effects by one round and drops the expired ones.
    ///
    /// Returns the effects that expired.
    pub fn tick_round(&mut self) -> Vec<ActiveEffect> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| match &mut effect.duration {
            EffectDuration::Permanent => true,
            EffectDuration::Rounds(remaining) => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(effect.clone());
                    false
                } else {
                    true
                }
            }
        });
        expired
    }
}

impl FromIterator<ActiveEffect> for ActiveEffects {
    fn from_iter<T: IntoIterator<Item = ActiveEffect>>(iter: T) -> Self {
        Self {
            effects: iter.into_iter().collect(),
        }
    }
}
