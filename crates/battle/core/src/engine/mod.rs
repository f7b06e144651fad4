//! Action execution pipeline.
//!
//! [`BattleEngine`] is the only mutator of [`BattleState`]. Every request runs
//! through pre_validate → apply → post_validate; a failure in any phase
//! leaves the state exactly as it was. After a successful request the engine
//! settles the turn order and asks the mission judge whether the battle is
//! over.

pub(crate) mod turns;

use tracing::{debug, warn};

use crate::action::{ActionError, ActionKind, ActionRequest, ActionTransition};
use crate::ai::EnemyDecider;
use crate::env::BattleEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{BattlePhase, BattleState, LogEntry, ParticipantId};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing a request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("{kind} rejected: {source}")]
    Rejected {
        kind: ActionKind,
        source: TransitionPhaseError<ActionError>,
    },

    #[error("the battle is already over")]
    BattleOver,
}

impl ExecuteError {
    fn rejected(kind: ActionKind, phase: TransitionPhase, error: ActionError) -> Self {
        ExecuteError::Rejected {
            kind,
            source: TransitionPhaseError::new(phase, error),
        }
    }

    /// The rule violation behind a rejection.
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            ExecuteError::Rejected { source, .. } => Some(&source.error),
            ExecuteError::BattleOver => None,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ExecuteError::Rejected { source, .. } => match source.phase {
                TransitionPhase::PreValidate => source.error.severity(),
                TransitionPhase::Apply | TransitionPhase::PostValidate => ErrorSeverity::Internal,
            },
            ExecuteError::BattleOver => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ExecuteError::Rejected { source, .. } => source.error.error_code(),
            ExecuteError::BattleOver => "EXECUTE_BATTLE_OVER",
        }
    }
}

/// What a resolved request produced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionReport {
    pub kind: ActionKind,
    /// Log entries appended by this request.
    pub log: Vec<LogEntry>,
    pub phase: BattlePhase,
    pub active_participant_id: Option<ParticipantId>,
}

/// Upper bound on requests in one enemy phase, guarding against deciders
/// that never end their turn.
pub const MAX_ENEMY_STEPS: usize = 1024;

/// Authoritative reducer for a [`BattleState`].
pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    /// Validates and resolves one request atomically.
    pub fn execute(
        &mut self,
        env: BattleEnv<'_>,
        request: &ActionRequest,
    ) -> Result<ActionReport, ExecuteError> {
        if self.state.phase.is_over() {
            return Err(ExecuteError::BattleOver);
        }

        let kind = request.kind();
        let transition = request.as_transition();
        let log_start = self.state.log.len();

        transition.pre_validate(self.state, &env).map_err(|error| {
            debug!(%kind, %error, "request rejected");
            ExecuteError::rejected(kind, TransitionPhase::PreValidate, error)
        })?;

        let before = self.state.clone();
        if let Err(err) = drive_mutation(transition, self.state, &env) {
            warn!(%kind, error = %err, "request failed after validation; state restored");
            *self.state = before;
            return Err(ExecuteError::Rejected { kind, source: err });
        }

        self.state.nonce += 1;
        turns::settle(self.state);

        let status = env.judge().evaluate(self.state);
        if status.is_resolved() {
            turns::end_battle(self.state, status);
        }

        Ok(ActionReport {
            kind,
            log: self.state.log.since(log_start).to_vec(),
            phase: self.state.phase,
            active_participant_id: self.state.active_participant_id.clone(),
        })
    }

    /// Resolves one request for the active enemy.
    ///
    /// A request the decider gets wrong is logged and replaced by ending the
    /// enemy's turn, so the phase always makes progress. Returns `None` outside
    /// the enemy phase.
    pub fn enemy_step(
        &mut self,
        env: BattleEnv<'_>,
        decider: &dyn EnemyDecider,
    ) -> Result<Option<ActionReport>, ExecuteError> {
        if self.state.phase != BattlePhase::EnemyActions {
            return Ok(None);
        }
        let Some(enemy) = self.state.active_participant_id.clone() else {
            warn!("enemy phase without an active enemy");
            return Ok(None);
        };

        let request = decider.decide(self.state, &env, &enemy);
        match self.execute(env, &request) {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                warn!(enemy = %enemy, error = %err, "enemy request rejected; ending its turn");
                let pending = self
                    .state
                    .follow_up_state
                    .as_ref()
                    .is_some_and(|f| f.participant_id == enemy);
                let fallback = if pending {
                    ActionRequest::skip_follow_up(enemy)
                } else {
                    ActionRequest::end_turn(enemy)
                };
                self.execute(env, &fallback).map(Some)
            }
        }
    }

    /// Runs enemy steps until the enemy phase is over.
    pub fn run_enemy_phase(
        &mut self,
        env: BattleEnv<'_>,
        decider: &dyn EnemyDecider,
    ) -> Result<Vec<ActionReport>, ExecuteError> {
        let mut reports = Vec::new();
        for _ in 0..MAX_ENEMY_STEPS {
            match self.enemy_step(env, decider)? {
                Some(report) => reports.push(report),
                None => return Ok(reports),
            }
        }
        warn!("enemy phase exceeded its step budget");
        Ok(reports)
    }
}

fn drive_mutation(
    transition: &dyn ActionTransition,
    state: &mut BattleState,
    env: &BattleEnv<'_>,
) -> Result<(), TransitionPhaseError<ActionError>> {
    transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))
}
