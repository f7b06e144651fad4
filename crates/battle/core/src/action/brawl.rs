use super::validation::{self, active_actor};
use super::{ActionError, ActionKind, ActionTransition, dice_for, index_of};
use crate::combat::{BrawlResult, resolve_brawl};
use crate::env::{BattleEnv, WeaponDefinition};
use crate::rules;
use crate::state::{BattleState, FollowUpState, LogEntry, Participant, ParticipantId};

/// Close combat with an adjacent opponent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrawlAction {
    pub actor: ParticipantId,
    pub target: ParticipantId,
    /// Weapon instance to fight with; `None` fights unarmed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<String>,
}

impl BrawlAction {
    fn weapon(
        &self,
        attacker: &Participant,
        env: &BattleEnv<'_>,
    ) -> Result<Option<WeaponDefinition>, ActionError> {
        let Some(instance_id) = self.weapon.as_deref() else {
            return Ok(None);
        };
        rules::get_effective_weapon(attacker, instance_id, env.armory()?)
            .map(Some)
            .ok_or_else(|| ActionError::WeaponUnavailable(instance_id.to_owned()))
    }
}

impl ActionTransition for BrawlAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Brawl
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let attacker = active_actor(state, &self.actor)?;
        validation::ensure_actions(attacker, 1)?;
        validation::ensure_combat(state, attacker, ActionKind::Brawl)?;

        let target = state
            .participant(&self.target)
            .ok_or_else(|| ActionError::TargetNotFound(self.target.clone()))?;
        if target.is_casualty() || !rules::is_opponent(attacker, target, state.multiplayer_role) {
            return Err(ActionError::InvalidTarget(self.target.clone()));
        }
        if attacker.position.distance(target.position) > 1 {
            return Err(ActionError::NotEngaged);
        }
        self.weapon(attacker, env)?;
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let attacker = index_of(state, &self.actor)?;
        let defender = index_of(state, &self.target)?;
        let weapon = self.weapon(&state.participants[attacker], env)?;
        let mut dice = dice_for(state, env, &self.actor)?;

        validation::spend_combat(&mut state.participants[attacker], 1);
        let result = resolve_brawl(state, attacker, defender, weapon, &mut dice, env);

        let earned_follow_up = result == BrawlResult::AttackerWins
            && !state.participants[attacker].is_casualty()
            && !state.participants[defender].is_casualty();
        if earned_follow_up {
            let max_move = env.config().follow_up_distance;
            state.follow_up_state = Some(FollowUpState {
                participant_id: self.actor.clone(),
                max_move,
            });
            state.push_log(
                LogEntry::new("follow_up_granted")
                    .source(&self.actor)
                    .param("max_move", max_move),
            );
        }
        Ok(())
    }
}
