//! Building a battle from its participants and board.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::config::BattleConfig;
use crate::env::ArmoryOracle;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{
    ActiveEffect, BattleState, EffectDuration, GridSize, Mission, MultiplayerRole, Participant,
    ParticipantId, Position, Terrain, WorldTrait,
};
use crate::stats::{Bonus, StatKind};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("participant {0} is listed twice")]
    DuplicateParticipant(ParticipantId),

    #[error("participant {id} deployed outside the grid at {position}")]
    OutOfBounds { id: ParticipantId, position: Position },

    #[error("participant {id} deployed on impassable terrain at {position}")]
    BlockedDeployment { id: ParticipantId, position: Position },

    #[error("participants {first} and {second} share {position}")]
    SharedCell {
        first: ParticipantId,
        second: ParticipantId,
        position: Position,
    },

    #[error("battle has no participants")]
    Empty,
}

impl GameError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            SetupError::DuplicateParticipant(_) => "SETUP_DUPLICATE_PARTICIPANT",
            SetupError::OutOfBounds { .. } => "SETUP_OUT_OF_BOUNDS",
            SetupError::BlockedDeployment { .. } => "SETUP_BLOCKED_DEPLOYMENT",
            SetupError::SharedCell { .. } => "SETUP_SHARED_CELL",
            SetupError::Empty => "SETUP_EMPTY",
        }
    }
}

/// Builder for the initial [`BattleState`].
///
/// `build` validates deployment, folds armor into permanent stat effects and
/// hands out starting story points. The result sits in the reaction roll of
/// round 1.
#[derive(Clone, Debug)]
pub struct BattleSetup {
    grid: GridSize,
    terrain: Vec<Terrain>,
    participants: Vec<Participant>,
    mission: Mission,
    world_traits: BTreeSet<WorldTrait>,
    multiplayer_role: Option<MultiplayerRole>,
    deployment_condition: Option<String>,
    seed: u64,
}

impl BattleSetup {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            terrain: Vec::new(),
            participants: Vec::new(),
            mission: Mission::fight(),
            world_traits: BTreeSet::new(),
            multiplayer_role: None,
            deployment_condition: None,
            seed: 0,
        }
    }

    pub fn terrain(mut self, terrain: Terrain) -> Self {
        self.terrain.push(terrain);
        self
    }

    pub fn participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    pub fn participants(mut self, participants: impl IntoIterator<Item = Participant>) -> Self {
        self.participants.extend(participants);
        self
    }

    pub fn mission(mut self, mission: Mission) -> Self {
        self.mission = mission;
        self
    }

    pub fn world_trait(mut self, world_trait: WorldTrait) -> Self {
        self.world_traits.insert(world_trait);
        self
    }

    pub fn multiplayer_role(mut self, role: MultiplayerRole) -> Self {
        self.multiplayer_role = Some(role);
        self
    }

    pub fn deployment_condition(mut self, condition: impl Into<String>) -> Self {
        self.deployment_condition = Some(condition.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(
        self,
        armory: &dyn ArmoryOracle,
        config: &BattleConfig,
    ) -> Result<BattleState, SetupError> {
        if self.participants.is_empty() {
            return Err(SetupError::Empty);
        }

        let mut state = BattleState::new(self.grid);
        state.terrain = self.terrain;
        state.mission = self.mission;
        state.world_traits = self.world_traits;
        state.multiplayer_role = self.multiplayer_role;
        state.deployment_condition = self.deployment_condition;
        state.seed = self.seed;

        let mut seen = BTreeSet::new();
        for mut participant in self.participants {
            if !seen.insert(participant.id.clone()) {
                return Err(SetupError::DuplicateParticipant(participant.id));
            }
            apply_armor(&mut participant, armory);
            state.participants.push(participant);
        }
        validate_deployment(&state)?;

        for participant in &state.participants {
            if let Some(side) = state.rolling_side(participant) {
                state
                    .story_points
                    .entry(side)
                    .or_insert(config.starting_story_points);
            }
        }

        info!(
            participants = state.participants.len(),
            width = state.grid.width,
            height = state.grid.height,
            seed = state.seed,
            "battle set up"
        );
        Ok(state)
    }
}

fn validate_deployment(state: &BattleState) -> Result<(), SetupError> {
    let geometry = state.geometry();
    for (index, participant) in state.participants.iter().enumerate() {
        let position = participant.position;
        if !geometry.in_bounds(position) {
            return Err(SetupError::OutOfBounds {
                id: participant.id.clone(),
                position,
            });
        }
        if geometry.is_blocked_by_terrain(position) {
            return Err(SetupError::BlockedDeployment {
                id: participant.id.clone(),
                position,
            });
        }
        let clash = state.participants[..index]
            .iter()
            .find(|other| other.position == position);
        if let Some(other) = clash {
            return Err(SetupError::SharedCell {
                first: other.id.clone(),
                second: participant.id.clone(),
                position,
            });
        }
    }
    Ok(())
}

/// Armor bonuses become permanent stat effects keyed by the armor id.
fn apply_armor(participant: &mut Participant, armory: &dyn ArmoryOracle) {
    let Some(armor_id) = participant.armor.clone() else {
        return;
    };
    let Some(armor) = armory.armor(&armor_id) else {
        warn!(participant = %participant.id, armor = %armor_id, "unknown armor ignored");
        return;
    };

    for (stat, value) in [
        (StatKind::Toughness, armor.toughness_bonus),
        (StatKind::Speed, armor.speed_bonus),
    ] {
        if value != 0 {
            participant.active_effects.push(ActiveEffect::stat(
                armor_id.clone(),
                stat,
                Bonus::flat(value),
                EffectDuration::Permanent,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ArmorDefinition, ArmorySnapshot};
    use crate::state::{RollingSide, TerrainKind};
    use crate::stats::{StatContext, Stats, calculate_effective_stats};

    fn stats() -> Stats {
        Stats::new(1, 4, 1, 3, 0, 0)
    }

    #[test]
    fn armor_bonuses_become_permanent_effects() {
        let armory = ArmorySnapshot::new().with_armor(ArmorDefinition {
            id: "combat_armor".into(),
            save: Some(5),
            toughness_bonus: 1,
            speed_bonus: -1,
        });
        let mut ada = Participant::character("c1", "Ada", Position::new(0, 0), stats());
        ada.armor = Some("combat_armor".into());

        let state = BattleSetup::new(GridSize::new(6, 6))
            .participant(ada)
            .build(&armory, &BattleConfig::default())
            .expect("valid setup");

        let effective = calculate_effective_stats(&state.participants[0], StatContext::General);
        assert_eq!(effective.toughness, 4);
        assert_eq!(effective.speed, 3);
        assert_eq!(state.story_points.get(&RollingSide::Crew), Some(&1));
    }

    #[test]
    fn unknown_armor_is_ignored() {
        let mut ada = Participant::character("c1", "Ada", Position::new(0, 0), stats());
        ada.armor = Some("missing".into());

        let state = BattleSetup::new(GridSize::new(6, 6))
            .participant(ada)
            .build(&ArmorySnapshot::new(), &BattleConfig::default())
            .expect("missing reference data is not fatal");
        assert!(state.participants[0].active_effects.is_empty());
    }

    #[test]
    fn rejects_bad_deployment() {
        let armory = ArmorySnapshot::new();
        let config = BattleConfig::default();

        let err = BattleSetup::new(GridSize::new(4, 4))
            .participant(Participant::character("c1", "Ada", Position::new(4, 0), stats()))
            .build(&armory, &config)
            .unwrap_err();
        assert!(matches!(err, SetupError::OutOfBounds { .. }));

        let err = BattleSetup::new(GridSize::new(4, 4))
            .terrain(Terrain::new("wall", TerrainKind::Wall, Position::new(1, 1)).impassable())
            .participant(Participant::character("c1", "Ada", Position::new(1, 1), stats()))
            .build(&armory, &config)
            .unwrap_err();
        assert_eq!(err.error_code(), "SETUP_BLOCKED_DEPLOYMENT");

        let err = BattleSetup::new(GridSize::new(4, 4))
            .participant(Participant::character("c1", "Ada", Position::new(0, 0), stats()))
            .participant(Participant::enemy(
                "e1",
                "Raider",
                "aggressive",
                Position::new(0, 0),
                stats(),
            ))
            .build(&armory, &config)
            .unwrap_err();
        assert!(matches!(err, SetupError::SharedCell { .. }));

        let err = BattleSetup::new(GridSize::new(4, 4))
            .participant(Participant::character("c1", "Ada", Position::new(0, 0), stats()))
            .participant(Participant::character("c1", "Ada", Position::new(1, 0), stats()))
            .build(&armory, &config)
            .unwrap_err();
        assert_eq!(err, SetupError::DuplicateParticipant(ParticipantId::new("c1")));
    }
}
