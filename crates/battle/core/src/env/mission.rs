//! Mission resolution.

use crate::rules;
use crate::state::{BattleState, MissionStatus};

/// Decides whether a battle has been won or lost.
pub trait MissionJudge: Send + Sync {
    fn evaluate(&self, state: &BattleState) -> MissionStatus;
}

/// Default judge driven by mission objectives and casualties.
///
/// The player side loses once all of its participants are casualties. It wins
/// once every objective is complete or, for missions without objectives, once
/// every opponent is a casualty.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectiveMissionJudge;

impl MissionJudge for ObjectiveMissionJudge {
    fn evaluate(&self, state: &BattleState) -> MissionStatus {
        let (players, opponents): (Vec<_>, Vec<_>) = state
            .participants
            .iter()
            .partition(|p| rules::is_player_side(state, p));

        if !players.is_empty() && players.iter().all(|p| p.is_casualty()) {
            return MissionStatus::Failure;
        }

        if state.mission.objectives.is_empty() {
            if !opponents.is_empty() && opponents.iter().all(|p| p.is_casualty()) {
                return MissionStatus::Success;
            }
        } else if state.mission.all_objectives_complete() {
            return MissionStatus::Success;
        }

        MissionStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GridSize, Mission, Objective, ObjectiveKind, Participant, Position};
    use crate::stats::Stats;

    fn skirmish() -> BattleState {
        let mut state = BattleState::new(GridSize::new(8, 8));
        let stats = Stats::new(1, 4, 0, 3, 0, 0);
        state.participants = vec![
            Participant::character("c1", "Ada", Position::new(0, 0), stats),
            Participant::enemy("e1", "Raider", "aggressive", Position::new(5, 5), stats),
        ];
        state
    }

    #[test]
    fn fight_is_won_when_opponents_fall() {
        let mut state = skirmish();
        assert_eq!(ObjectiveMissionJudge.evaluate(&state), MissionStatus::InProgress);
        state.participants[1].mark_casualty();
        assert_eq!(ObjectiveMissionJudge.evaluate(&state), MissionStatus::Success);
    }

    #[test]
    fn losing_the_crew_fails() {
        let mut state = skirmish();
        state.participants[0].mark_casualty();
        assert_eq!(ObjectiveMissionJudge.evaluate(&state), MissionStatus::Failure);
    }

    #[test]
    fn objective_missions_ignore_kill_count() {
        let mut state = skirmish();
        state.mission = Mission::fight().with_objective(Objective::new(
            "crate",
            ObjectiveKind::PickUpItem,
            Position::new(3, 3),
        ));
        state.participants[1].mark_casualty();
        assert_eq!(ObjectiveMissionJudge.evaluate(&state), MissionStatus::InProgress);

        if let Some(objective) = state.mission.objective_mut("crate") {
            objective.completed_by = Some("c1".into());
        }
        assert_eq!(ObjectiveMissionJudge.evaluate(&state), MissionStatus::Success);
    }
}
