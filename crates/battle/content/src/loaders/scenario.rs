//! Scenario loader: board, squads and mission for one battle.

use std::path::Path;

use battle_core::config::BattleConfig;
use battle_core::setup::BattleSetup;
use battle_core::state::{
    GridSize, Mission, MultiplayerRole, Participant, ParticipantId, ParticipantKind, Position,
    SpecialAbility, Terrain, WeaponInstance, WorldTrait,
};
use battle_core::stats::Stats;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One combatant as written in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSpec {
    pub id: String,
    pub name: String,
    pub kind: ParticipantKind,
    pub position: Position,
    pub stats: Stats,
    #[serde(default)]
    pub weapons: Vec<WeaponInstance>,
    #[serde(default)]
    pub armor: Option<String>,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub consumables: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
}

impl ParticipantSpec {
    pub fn into_participant(self) -> LoadResult<Participant> {
        if self.weapons.len() > BattleConfig::MAX_WEAPONS {
            anyhow::bail!(
                "Participant '{}' carries {} weapons, at most {} allowed",
                self.id,
                self.weapons.len(),
                BattleConfig::MAX_WEAPONS
            );
        }

        let mut participant = Participant::new(
            ParticipantId::new(self.id),
            self.name,
            self.kind,
            self.position,
            self.stats,
        );
        participant.weapons.extend(self.weapons);
        participant.armor = self.armor;
        participant.screen = self.screen;
        participant.consumables = self.consumables;
        participant.special_abilities.extend(self.abilities);
        Ok(participant)
    }
}

/// Scenario structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub grid: GridSize,
    #[serde(default)]
    pub terrain: Vec<Terrain>,
    pub participants: Vec<ParticipantSpec>,
    #[serde(default)]
    pub mission: Mission,
    #[serde(default)]
    pub world_traits: Vec<WorldTrait>,
    #[serde(default)]
    pub multiplayer_role: Option<MultiplayerRole>,
    #[serde(default)]
    pub deployment_condition: Option<String>,
    #[serde(default)]
    pub seed: u64,
}

impl ScenarioSpec {
    /// Converts the scenario into a setup ready to `build`.
    pub fn into_setup(self) -> LoadResult<BattleSetup> {
        let mut setup = BattleSetup::new(self.grid)
            .mission(self.mission)
            .seed(self.seed);
        for terrain in self.terrain {
            setup = setup.terrain(terrain);
        }
        for world_trait in self.world_traits {
            setup = setup.world_trait(world_trait);
        }
        if let Some(role) = self.multiplayer_role {
            setup = setup.multiplayer_role(role);
        }
        if let Some(condition) = self.deployment_condition {
            setup = setup.deployment_condition(condition);
        }
        for spec in self.participants {
            setup = setup.participant(spec.into_participant()?);
        }
        Ok(setup)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::env::ArmorySnapshot;
    use battle_core::state::{BattlePhase, TerrainKind};

    const SCENARIO: &str = r#"(
        grid: (width: 10, height: 8),
        terrain: [
            (id: "crates", kind: Crates, position: (x: 4, y: 3), width: 2, height: 1, impassable: true, cover: Low),
        ],
        participants: [
            (
                id: "c1",
                name: "Ada",
                kind: Character(xp: 3),
                position: (x: 0, y: 0),
                stats: (reactions: 2, speed: 4, combat: 1, toughness: 4, savvy: 1, luck: 1),
                weapons: [(instance_id: "w1", weapon_id: "rifle")],
                abilities: [Tactician],
            ),
            (
                id: "e1",
                name: "Raider",
                kind: Enemy(ai_template: "aggressive"),
                position: (x: 9, y: 7),
                stats: (reactions: 1, speed: 4, combat: 0, toughness: 3, savvy: 0, luck: 0),
            ),
        ],
        world_traits: [Frozen],
        seed: 42,
    )"#;

    #[test]
    fn scenario_builds_a_battle() {
        let spec = ScenarioLoader::parse(SCENARIO).expect("valid scenario");
        let state = spec
            .into_setup()
            .expect("valid participants")
            .build(&ArmorySnapshot::new(), &BattleConfig::default())
            .expect("valid deployment");

        assert_eq!(state.grid, GridSize::new(10, 8));
        assert_eq!(state.terrain[0].kind, TerrainKind::Crates);
        assert_eq!(state.participants.len(), 2);
        assert!(state.participants[0].has_ability(SpecialAbility::Tactician));
        assert_eq!(state.participants[0].weapons[0].weapon_id, "rifle");
        assert!(state.has_trait(WorldTrait::Frozen));
        assert_eq!(state.seed, 42);
        assert_eq!(state.phase, BattlePhase::ReactionRoll);
    }

    #[test]
    fn too_many_weapons_is_an_error() {
        let spec = ParticipantSpec {
            id: "c1".into(),
            name: "Ada".into(),
            kind: ParticipantKind::Character { xp: 0 },
            position: Position::new(0, 0),
            stats: Stats::default(),
            weapons: (0..4)
                .map(|i| WeaponInstance::new(format!("w{i}"), "rifle"))
                .collect(),
            armor: None,
            screen: None,
            consumables: Vec::new(),
            abilities: Vec::new(),
        };
        assert!(spec.into_participant().is_err());
    }
}
