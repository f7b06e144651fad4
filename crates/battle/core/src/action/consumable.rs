use super::validation::{self, active_actor};
use super::{ActionError, ActionKind, ActionTransition, index_of};
use crate::env::{BattleEnv, ConsumableEffect};
use crate::state::{
    ActiveEffect, BattleState, EffectDuration, EffectKind, LogEntry, ParticipantId,
    ParticipantStatus,
};
use crate::stats::Bonus;

/// Use a carried consumable.
///
/// Up to two per turn; the first is free before moving or fighting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseConsumableAction {
    pub actor: ParticipantId,
    pub consumable: String,
}

impl ActionTransition for UseConsumableAction {
    fn kind(&self) -> ActionKind {
        ActionKind::UseConsumable
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let participant = active_actor(state, &self.actor)?;
        validation::ensure_consumable_allowed(participant, &self.consumable, env)?;
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let index = index_of(state, &self.actor)?;
        let definition = env
            .armory()?
            .consumable(&self.consumable)
            .ok_or_else(|| ActionError::ConsumableUnavailable(self.consumable.clone()))?;

        let participant = &mut state.participants[index];
        let cost = validation::consumable_cost(participant);
        participant.spend_actions(cost);
        participant.consumables_used_this_turn += 1;
        if let Some(slot) = participant.consumables.iter().position(|c| c == &self.consumable) {
            participant.consumables.remove(slot);
        }

        match definition.effect {
            ConsumableEffect::StatBoost {
                stat,
                bonus,
                rounds,
            } => participant.active_effects.push(ActiveEffect::stat(
                self.consumable.clone(),
                stat,
                Bonus::flat(bonus),
                EffectDuration::Rounds(rounds),
            )),
            ConsumableEffect::Recover => {
                participant.stun_tokens = 0;
                if matches!(
                    participant.status,
                    ParticipantStatus::Stunned | ParticipantStatus::Dazed
                ) {
                    participant.status = ParticipantStatus::Active;
                }
            }
            ConsumableEffect::Steady => participant.active_effects.retain(|effect| {
                !matches!(effect.kind, EffectKind::Terrified { .. } | EffectKind::Suppressed)
            }),
        }

        state.push_log(
            LogEntry::new("consumable_used")
                .source(&self.actor)
                .param("consumable", self.consumable.as_str())
                .param("cost", cost),
        );
        Ok(())
    }
}
