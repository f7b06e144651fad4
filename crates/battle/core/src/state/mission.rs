//! Mission objectives as seen by the battle rules.
//!
//! Mission advancement beyond interact resolution belongs to the mission
//! provider; the engine only records objective completion.

use super::{ParticipantId, Position};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MissionKind {
    /// Win by eliminating the opposition.
    #[default]
    Fight,
    Acquire,
    Deliver,
    Access,
    Patrol,
    Search,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ObjectiveKind {
    PickUpItem,
    PlacePackage,
    AccessConsole,
    ScanPatrolPoint,
    Search,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub id: String,
    pub kind: ObjectiveKind,
    pub position: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed_by: Option<ParticipantId>,
}

impl Objective {
    pub fn new(id: impl Into<String>, kind: ObjectiveKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            completed_by: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_by.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MissionStatus {
    InProgress,
    Success,
    Failure,
}

impl MissionStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, MissionStatus::InProgress)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mission {
    pub kind: MissionKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub objectives: Vec<Objective>,
}

impl Mission {
    pub fn fight() -> Self {
        Self::default()
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    pub fn objective_mut(&mut self, id: &str) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id == id)
    }

    pub fn all_objectives_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(Objective::is_complete)
    }
}
