//! Action requests and their transitions.
//!
//! Every request a player, the enemy AI or the runtime can make is one
//! [`ActionRequest`] variant wrapping a concrete action. Each action implements
//! [`ActionTransition`]: `pre_validate` decides legality without touching the
//! state, `apply` rolls dice and mutates, `post_validate` checks invariants.

mod brawl;
mod consumable;
mod error;
mod initiative;
mod interact;
mod movement;
mod shooting;
mod turn;
pub mod validation;

pub use brawl::BrawlAction;
pub use consumable::UseConsumableAction;
pub use error::ActionError;
pub use initiative::{
    FinishReactionRollAction, RollInitiativeAction, SeizeInitiativeAction, first_missing_roll,
};
pub use interact::InteractAction;
pub use movement::{FollowUpAction, MoveAction, SlideAction, TeleportAction};
pub use shooting::{PanicFireAction, ShootAction, ShotMode};
pub use turn::EndTurnAction;

use crate::env::{BattleEnv, Dice};
use crate::state::{BattleState, ParticipantId, Position, RollingSide};

/// Tag of an action type, used for offering and error reporting.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    RollInitiative,
    SeizeInitiative,
    FinishReactionRoll,
    Move,
    Dash,
    Slide,
    Teleport,
    SnapShot,
    AimedShot,
    PanicFire,
    Brawl,
    Interact,
    UseConsumable,
    FollowUpMove,
    SkipFollowUp,
    EndTurn,
}

/// Validation and mutation hooks of one action.
pub trait ActionTransition {
    fn kind(&self) -> ActionKind;

    /// Participant acting, if the action has one.
    fn actor(&self) -> Option<&ParticipantId>;

    /// Checks legality against the state **before** mutation.
    fn pre_validate(&self, _state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        Ok(())
    }

    /// Mutates the state. Assumes `pre_validate` passed.
    fn apply(&self, state: &mut BattleState, env: &BattleEnv<'_>) -> Result<(), ActionError>;

    /// Checks invariants **after** mutation.
    fn post_validate(&self, _state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Everything that can be asked of the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ActionRequest {
    RollInitiative(RollInitiativeAction),
    SeizeInitiative(SeizeInitiativeAction),
    FinishReactionRoll(FinishReactionRollAction),
    Move(MoveAction),
    Slide(SlideAction),
    Teleport(TeleportAction),
    Shoot(ShootAction),
    PanicFire(PanicFireAction),
    Brawl(BrawlAction),
    Interact(InteractAction),
    UseConsumable(UseConsumableAction),
    FollowUp(FollowUpAction),
    EndTurn(EndTurnAction),
}

impl ActionRequest {
    pub fn roll_initiative(participant: impl Into<ParticipantId>) -> Self {
        Self::RollInitiative(RollInitiativeAction {
            participant: participant.into(),
        })
    }

    pub fn seize_initiative(side: RollingSide) -> Self {
        Self::SeizeInitiative(SeizeInitiativeAction { side })
    }

    pub fn finish_reaction_roll() -> Self {
        Self::FinishReactionRoll(FinishReactionRollAction)
    }

    pub fn move_to(actor: impl Into<ParticipantId>, destination: Position) -> Self {
        Self::Move(MoveAction {
            actor: actor.into(),
            destination,
            dash: false,
        })
    }

    pub fn dash_to(actor: impl Into<ParticipantId>, destination: Position) -> Self {
        Self::Move(MoveAction {
            actor: actor.into(),
            destination,
            dash: true,
        })
    }

    pub fn slide(actor: impl Into<ParticipantId>, toward: Position) -> Self {
        Self::Slide(SlideAction {
            actor: actor.into(),
            toward,
        })
    }

    pub fn teleport(actor: impl Into<ParticipantId>, destination: Position) -> Self {
        Self::Teleport(TeleportAction {
            actor: actor.into(),
            destination,
        })
    }

    pub fn shoot(
        actor: impl Into<ParticipantId>,
        target: impl Into<ParticipantId>,
        weapon: impl Into<String>,
        mode: ShotMode,
    ) -> Self {
        Self::Shoot(ShootAction {
            actor: actor.into(),
            target: target.into(),
            weapon: weapon.into(),
            mode,
        })
    }

    pub fn panic_fire(actor: impl Into<ParticipantId>, weapon: impl Into<String>) -> Self {
        Self::PanicFire(PanicFireAction {
            actor: actor.into(),
            weapon: weapon.into(),
        })
    }

    pub fn brawl(
        actor: impl Into<ParticipantId>,
        target: impl Into<ParticipantId>,
        weapon: Option<String>,
    ) -> Self {
        Self::Brawl(BrawlAction {
            actor: actor.into(),
            target: target.into(),
            weapon,
        })
    }

    pub fn interact(actor: impl Into<ParticipantId>, objective: impl Into<String>) -> Self {
        Self::Interact(InteractAction {
            actor: actor.into(),
            objective: objective.into(),
        })
    }

    pub fn use_consumable(actor: impl Into<ParticipantId>, consumable: impl Into<String>) -> Self {
        Self::UseConsumable(UseConsumableAction {
            actor: actor.into(),
            consumable: consumable.into(),
        })
    }

    pub fn follow_up(actor: impl Into<ParticipantId>, destination: Position) -> Self {
        Self::FollowUp(FollowUpAction {
            actor: actor.into(),
            destination: Some(destination),
        })
    }

    pub fn skip_follow_up(actor: impl Into<ParticipantId>) -> Self {
        Self::FollowUp(FollowUpAction {
            actor: actor.into(),
            destination: None,
        })
    }

    pub fn end_turn(actor: impl Into<ParticipantId>) -> Self {
        Self::EndTurn(EndTurnAction {
            actor: actor.into(),
        })
    }

    pub fn as_transition(&self) -> &dyn ActionTransition {
        match self {
            Self::RollInitiative(a) => a,
            Self::SeizeInitiative(a) => a,
            Self::FinishReactionRoll(a) => a,
            Self::Move(a) => a,
            Self::Slide(a) => a,
            Self::Teleport(a) => a,
            Self::Shoot(a) => a,
            Self::PanicFire(a) => a,
            Self::Brawl(a) => a,
            Self::Interact(a) => a,
            Self::UseConsumable(a) => a,
            Self::FollowUp(a) => a,
            Self::EndTurn(a) => a,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.as_transition().kind()
    }

    pub fn actor(&self) -> Option<&ParticipantId> {
        self.as_transition().actor()
    }
}

/// Dice stream for `actor`'s current request.
pub(crate) fn dice_for<'e>(
    state: &BattleState,
    env: &BattleEnv<'e>,
    actor: &ParticipantId,
) -> Result<Dice<'e>, ActionError> {
    let index = state.index_of(actor).unwrap_or(usize::MAX) as u32;
    Ok(Dice::new(env.rng()?, state.seed, state.nonce, index))
}

/// Index of `id`, or `ParticipantNotFound`.
pub(crate) fn index_of(state: &BattleState, id: &ParticipantId) -> Result<usize, ActionError> {
    state
        .index_of(id)
        .ok_or_else(|| ActionError::ParticipantNotFound(id.clone()))
}
