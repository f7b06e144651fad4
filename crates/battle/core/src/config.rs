/// Battle rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Cells a terrified participant flees from the fear source.
    pub flee_distance: u32,
    /// Cells granted by a won brawl.
    pub follow_up_distance: u32,
    /// Sides of the die rolled for teleport distance.
    pub teleport_die: u32,
    /// Sides of the die rolled for slide distance.
    pub slide_die: u32,
    /// Target number in the open within short range.
    pub hit_target_open: i32,
    /// Target number in cover or beyond short range.
    pub hit_target_hard: i32,
    /// Target number in cover and beyond short range.
    pub hit_target_very_hard: i32,
    pub aimed_bonus: i32,
    pub snap_shot_trait_bonus: i32,
    pub panic_fire_penalty: i32,
    /// Savvy check target for accessing a console.
    pub console_target: i32,
    /// Rounds a terrifying hit keeps its victim panicked.
    pub terrified_rounds: u32,
    /// Rounds a heavy-weapon miss keeps its target pinned.
    pub suppressed_rounds: u32,
    /// Story points each rolling side starts with.
    pub starting_story_points: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_ACTIONS: u8 = 2;
    pub const MAX_WEAPONS: usize = 3;
    pub const MAX_CONSUMABLE_USES: u8 = 2;
    pub const MAX_COMBAT_ACTIONS_DOUBLE: u8 = 2;
    pub const DIE: u32 = 6;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FLEE_DISTANCE: u32 = 3;
    pub const DEFAULT_FOLLOW_UP_DISTANCE: u32 = 2;
    pub const DEFAULT_TELEPORT_DIE: u32 = 6;
    pub const DEFAULT_SLIDE_DIE: u32 = 3;
    pub const DEFAULT_HIT_TARGET_OPEN: i32 = 3;
    pub const DEFAULT_HIT_TARGET_HARD: i32 = 5;
    pub const DEFAULT_HIT_TARGET_VERY_HARD: i32 = 6;
    pub const DEFAULT_AIMED_BONUS: i32 = 1;
    pub const DEFAULT_SNAP_SHOT_TRAIT_BONUS: i32 = 1;
    pub const DEFAULT_PANIC_FIRE_PENALTY: i32 = 2;
    pub const DEFAULT_CONSOLE_TARGET: i32 = 5;
    pub const DEFAULT_TERRIFIED_ROUNDS: u32 = 2;
    pub const DEFAULT_SUPPRESSED_ROUNDS: u32 = 2;
    pub const DEFAULT_STARTING_STORY_POINTS: u32 = 1;

    pub const fn new() -> Self {
        Self {
            flee_distance: Self::DEFAULT_FLEE_DISTANCE,
            follow_up_distance: Self::DEFAULT_FOLLOW_UP_DISTANCE,
            teleport_die: Self::DEFAULT_TELEPORT_DIE,
            slide_die: Self::DEFAULT_SLIDE_DIE,
            hit_target_open: Self::DEFAULT_HIT_TARGET_OPEN,
            hit_target_hard: Self::DEFAULT_HIT_TARGET_HARD,
            hit_target_very_hard: Self::DEFAULT_HIT_TARGET_VERY_HARD,
            aimed_bonus: Self::DEFAULT_AIMED_BONUS,
            snap_shot_trait_bonus: Self::DEFAULT_SNAP_SHOT_TRAIT_BONUS,
            panic_fire_penalty: Self::DEFAULT_PANIC_FIRE_PENALTY,
            console_target: Self::DEFAULT_CONSOLE_TARGET,
            terrified_rounds: Self::DEFAULT_TERRIFIED_ROUNDS,
            suppressed_rounds: Self::DEFAULT_SUPPRESSED_ROUNDS,
            starting_story_points: Self::DEFAULT_STARTING_STORY_POINTS,
        }
    }

    /// Target number for a shot given cover and range band.
    pub fn hit_target(&self, in_cover: bool, beyond_short_range: bool) -> i32 {
        match (in_cover, beyond_short_range) {
            (false, false) => self.hit_target_open,
            (true, true) => self.hit_target_very_hard,
            _ => self.hit_target_hard,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
