use tracing::debug;

use super::validation::{self, active_actor};
use super::{ActionError, ActionKind, ActionTransition, dice_for, index_of};
use crate::combat::{resolve_damage, roll_to_hit};
use crate::env::{BattleEnv, Dice, WeaponDefinition, WeaponTraits};
use crate::rules;
use crate::state::{ActiveEffect, BattleState, LogEntry, Participant, ParticipantId};
use crate::visibility::has_line_of_sight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ShotMode {
    Snap,
    /// Costs two actions and cannot follow a move.
    Aimed,
}

/// Shoot an opponent with a carried ranged weapon.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShootAction {
    pub actor: ParticipantId,
    pub target: ParticipantId,
    /// Weapon instance id.
    pub weapon: String,
    pub mode: ShotMode,
}

impl ShootAction {
    fn cost(&self, shooter: &Participant) -> u8 {
        match self.mode {
            ShotMode::Snap => 1,
            ShotMode::Aimed => validation::aimed_cost(shooter),
        }
    }
}

fn ranged_weapon(
    participant: &Participant,
    instance_id: &str,
    env: &BattleEnv<'_>,
) -> Result<WeaponDefinition, ActionError> {
    rules::get_effective_weapon(participant, instance_id, env.armory()?)
        .filter(WeaponDefinition::can_shoot)
        .ok_or_else(|| ActionError::WeaponUnavailable(instance_id.to_owned()))
}

impl ActionTransition for ShootAction {
    fn kind(&self) -> ActionKind {
        match self.mode {
            ShotMode::Snap => ActionKind::SnapShot,
            ShotMode::Aimed => ActionKind::AimedShot,
        }
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let shooter = active_actor(state, &self.actor)?;
        validation::ensure_shot_allowed(state, shooter, self.kind(), self.cost(shooter))?;
        let weapon = ranged_weapon(shooter, &self.weapon, env)?;

        let target = state
            .participant(&self.target)
            .ok_or_else(|| ActionError::TargetNotFound(self.target.clone()))?;
        if target.is_casualty() || !rules::is_opponent(shooter, target, state.multiplayer_role) {
            return Err(ActionError::InvalidTarget(self.target.clone()));
        }

        let distance = shooter.position.distance(target.position);
        let range = weapon.range.cells().unwrap_or(0);
        if distance > range {
            return Err(ActionError::OutOfRange { distance, range });
        }
        if !has_line_of_sight(shooter.position, target.position, &state.geometry()) {
            return Err(ActionError::NoLineOfSight);
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let shooter = index_of(state, &self.actor)?;
        let target = index_of(state, &self.target)?;
        let weapon = ranged_weapon(&state.participants[shooter], &self.weapon, env)?;
        let mut dice = dice_for(state, env, &self.actor)?;
        let config = env.config();

        let modifier = match self.mode {
            ShotMode::Aimed => config.aimed_bonus,
            ShotMode::Snap if weapon.traits.contains(WeaponTraits::SNAP_SHOT) => {
                config.snap_shot_trait_bonus
            }
            ShotMode::Snap => 0,
        };
        let cost = self.cost(&state.participants[shooter]);
        validation::spend_combat(&mut state.participants[shooter], cost);

        for _ in 0..weapon.shots {
            if state.participants[target].is_casualty() {
                break;
            }
            fire_shot(state, shooter, target, &weapon, modifier, &mut dice, env);
        }
        Ok(())
    }
}

/// Unaimed fire at random valid targets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanicFireAction {
    pub actor: ParticipantId,
    pub weapon: String,
}

impl PanicFireAction {
    fn target_indices(
        &self,
        state: &BattleState,
        shooter: usize,
        weapon: &WeaponDefinition,
    ) -> Vec<usize> {
        rules::get_valid_shoot_targets(state, &state.participants[shooter], weapon)
            .into_iter()
            .filter_map(|target| state.index_of(&target.id))
            .collect()
    }
}

impl ActionTransition for PanicFireAction {
    fn kind(&self) -> ActionKind {
        ActionKind::PanicFire
    }

    fn actor(&self) -> Option<&ParticipantId> {
        Some(&self.actor)
    }

    fn pre_validate(&self, state: &BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let shooter = active_actor(state, &self.actor)?;
        validation::ensure_actions(shooter, 1)?;
        validation::ensure_combat(state, shooter, ActionKind::PanicFire)?;
        let weapon = ranged_weapon(shooter, &self.weapon, env)?;
        if rules::get_valid_shoot_targets(state, shooter, &weapon).is_empty() {
            return Err(ActionError::NoValidTargets);
        }
        Ok(())
    }

    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError> {
        let shooter = index_of(state, &self.actor)?;
        let weapon = ranged_weapon(&state.participants[shooter], &self.weapon, env)?;
        let mut dice = dice_for(state, env, &self.actor)?;
        let modifier = -env.config().panic_fire_penalty;

        validation::spend_combat(&mut state.participants[shooter], 1);
        state.push_log(LogEntry::new("panic_fire").source(&self.actor));

        for _ in 0..weapon.shots {
            let targets = self.target_indices(state, shooter, &weapon);
            if targets.is_empty() {
                break;
            }
            let target = targets[dice.pick(targets.len())];
            fire_shot(state, shooter, target, &weapon, modifier, &mut dice, env);
        }
        Ok(())
    }
}

fn fire_shot(
    state: &mut BattleState,
    shooter: usize,
    target: usize,
    weapon: &WeaponDefinition,
    modifier: i32,
    dice: &mut Dice<'_>,
    env: &BattleEnv<'_>,
) {
    let target_position = state.participants[target].position;
    let roll = roll_to_hit(
        &state.participants[shooter],
        target_position,
        weapon,
        modifier,
        &state.geometry(),
        env.config(),
        dice,
    );

    let shooter_id = state.participants[shooter].id.clone();
    let target_id = state.participants[target].id.clone();
    debug!(shooter = %shooter_id, victim = %target_id, ?roll, "shot rolled");
    state.push_log(
        LogEntry::new(if roll.hit { "shot_hit" } else { "shot_missed" })
            .source(&shooter_id)
            .param("target", &target_id)
            .param("roll", roll.natural)
            .param("total", roll.total)
            .param("needed", roll.target_number)
            .param("cover", if roll.in_cover { "yes" } else { "no" }),
    );

    if roll.hit {
        resolve_damage(state, shooter, target, weapon.damage, dice, env);
    } else if weapon.traits.contains(WeaponTraits::HEAVY) {
        let source_name = state.participants[shooter].name.clone();
        suppress(state, target, &source_name, env);
    }
}

fn suppress(state: &mut BattleState, target: usize, source_name: &str, env: &BattleEnv<'_>) {
    let victim = &mut state.participants[target];
    if victim.is_casualty() || victim.active_effects.is_suppressed() {
        return;
    }
    victim
        .active_effects
        .push(ActiveEffect::suppressed(source_name, env.config().suppressed_rounds));
    let victim_id = victim.id.clone();
    state.push_log(LogEntry::new("suppressed").source(&victim_id));
}
