//! Round structure: reaction roll, activation orders, enemy phase and
//! round-start housekeeping.

use battle_core::action::{ActionError, ActionRequest, first_missing_roll};
use battle_core::ai::{ClosestTargetAi, EnemyDecider};
use battle_core::config::BattleConfig;
use battle_core::engine::{ActionReport, BattleEngine, ExecuteError};
use battle_core::env::{ArmorySnapshot, BattleEnv, ScriptedRng};
use battle_core::setup::BattleSetup;
use battle_core::state::{
    ActiveEffect, BattlePhase, BattleState, GridSize, MultiplayerRole, Participant, ParticipantId,
    ParticipantStatus, Position, RollingSide,
};
use battle_core::stats::Stats;

fn id(raw: &str) -> ParticipantId {
    ParticipantId::new(raw)
}

fn crew_battle(slow_reactions: i32) -> BattleState {
    BattleSetup::new(GridSize::new(12, 8))
        .participant(Participant::character(
            "c1",
            "Ada",
            Position::new(0, 0),
            Stats::new(6, 4, 1, 4, 0, 0),
        ))
        .participant(Participant::character(
            "c2",
            "Bo",
            Position::new(0, 2),
            Stats::new(slow_reactions, 4, 1, 4, 0, 0),
        ))
        .participant(Participant::enemy(
            "e1",
            "Raider",
            "aggressive",
            Position::new(11, 7),
            Stats::new(1, 4, 1, 4, 0, 0),
        ))
        .seed(7)
        .build(&ArmorySnapshot::new(), &BattleConfig::default())
        .expect("valid setup")
}

fn rejection(result: Result<ActionReport, ExecuteError>) -> ActionError {
    result
        .unwrap_err()
        .action_error()
        .cloned()
        .expect("rule rejection")
}

#[test]
fn full_round_walks_every_phase() {
    let mut state = crew_battle(0);
    let rng = ScriptedRng::new([3]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);

    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::finish_reaction_roll())),
        ActionError::InitiativeOutOfOrder(id("c1"))
    );
    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::roll_initiative("e1"))),
        ActionError::InvalidTarget(id("e1"))
    );

    engine.execute(env, &ActionRequest::roll_initiative("c1")).expect("roll");
    engine.execute(env, &ActionRequest::roll_initiative("c2")).expect("roll");
    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::roll_initiative("c2"))),
        ActionError::InitiativeAlreadyRolled(id("c2"))
    );
    engine.execute(env, &ActionRequest::finish_reaction_roll()).expect("all rolled");

    let state = engine.state();
    assert_eq!(state.phase, BattlePhase::QuickActions);
    assert_eq!(state.quick_action_order, vec![id("c1")]);
    assert_eq!(state.slow_action_order, vec![id("c2")]);
    assert_eq!(state.enemy_turn_order, vec![id("e1")]);
    assert_eq!(state.active_participant_id, Some(id("c1")));

    engine.execute(env, &ActionRequest::end_turn("c1")).expect("end c1");
    assert_eq!(engine.state().phase, BattlePhase::SlowActions);
    assert_eq!(engine.state().active_participant_id, Some(id("c2")));

    engine.execute(env, &ActionRequest::end_turn("c2")).expect("end c2");
    assert_eq!(engine.state().phase, BattlePhase::EnemyActions);
    assert_eq!(engine.state().active_participant_id, Some(id("e1")));

    let start = engine.state().participants[2].position;
    let reports = engine.run_enemy_phase(env, &ClosestTargetAi).expect("enemy phase");
    assert_eq!(reports.len(), 2);

    let state = engine.state();
    let raider = &state.participants[2];
    assert!(raider.position.distance(Position::new(0, 2)) < start.distance(Position::new(0, 2)));
    assert_eq!(state.phase, BattlePhase::ReactionRoll);
    assert_eq!(state.round, 2);
    assert!(state.reaction_rolls.is_empty());
    assert!(state.active_participant_id.is_none());
    assert_eq!(raider.actions_remaining, 2);
}

#[test]
fn round_start_clears_expired_effects_and_stun() {
    let mut state = crew_battle(6);
    state.participants[1].add_stun();
    state.participants[1]
        .active_effects
        .push(ActiveEffect::suppressed("Gunner", 1));
    let rng = ScriptedRng::new([1]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);

    for roller in ["c1", "c2"] {
        engine.execute(env, &ActionRequest::roll_initiative(roller)).expect("roll");
    }
    engine.execute(env, &ActionRequest::finish_reaction_roll()).expect("finish");
    assert_eq!(engine.state().participants[1].actions_remaining, 1);
    for actor in ["c1", "c2"] {
        engine.execute(env, &ActionRequest::end_turn(actor)).expect("end turn");
    }
    engine.run_enemy_phase(env, &ClosestTargetAi).expect("enemy phase");

    let state = engine.state();
    let bo = &state.participants[1];
    assert_eq!(state.round, 2);
    assert_eq!(bo.status, ParticipantStatus::Active);
    assert_eq!(bo.stun_tokens, 0);
    assert!(bo.active_effects.is_empty());
    assert_eq!(bo.actions_remaining, 2);
    assert!(state.log.contains_key("effect_expired"));
    assert!(state.log.contains_key("status_cleared"));
}

#[test]
fn seizing_the_initiative_rerolls_failures_once() {
    let mut state = crew_battle(4);
    // c1 rolls 3, c2 fails with a 6, the reroll is 3 + 1.
    let rng = ScriptedRng::new([3, 6, 3]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);

    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::seize_initiative(RollingSide::Crew))),
        ActionError::InitiativeOutOfOrder(id("c1"))
    );
    engine.execute(env, &ActionRequest::roll_initiative("c1")).expect("roll");
    engine.execute(env, &ActionRequest::roll_initiative("c2")).expect("roll");
    assert!(!engine.state().reaction_rolls[&id("c2")].success);

    engine
        .execute(env, &ActionRequest::seize_initiative(RollingSide::Crew))
        .expect("story point available");
    let state = engine.state();
    assert_eq!(state.reaction_rolls[&id("c2")].roll, 4);
    assert!(state.reaction_rolls[&id("c2")].success);
    assert_eq!(state.story_points[&RollingSide::Crew], 0);

    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::seize_initiative(RollingSide::Crew))),
        ActionError::SeizeUnavailable(RollingSide::Crew)
    );
}

#[test]
fn guest_rolls_after_the_host() {
    let mut state = BattleSetup::new(GridSize::new(8, 8))
        .participant(Participant::character(
            "host_a",
            "Ada",
            Position::new(0, 0),
            Stats::new(3, 4, 1, 4, 0, 0),
        ))
        .participant(Participant::character(
            "guest_a",
            "Cy",
            Position::new(7, 7),
            Stats::new(3, 4, 1, 4, 0, 0),
        ))
        .multiplayer_role(MultiplayerRole::Host)
        .build(&ArmorySnapshot::new(), &BattleConfig::default())
        .expect("valid setup");
    let rng = ScriptedRng::new([2]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);

    assert_eq!(
        rejection(engine.execute(env, &ActionRequest::roll_initiative("guest_a"))),
        ActionError::InitiativeOutOfOrder(id("guest_a"))
    );
    engine.execute(env, &ActionRequest::roll_initiative("host_a")).expect("host first");
    engine.execute(env, &ActionRequest::roll_initiative("guest_a")).expect("then guest");
}

#[test]
fn next_roller_is_a_host_even_when_a_guest_is_listed_first() {
    let mut state = BattleSetup::new(GridSize::new(8, 8))
        .participant(Participant::character(
            "guest_a",
            "Cy",
            Position::new(7, 7),
            Stats::new(3, 4, 1, 4, 0, 0),
        ))
        .participant(Participant::character(
            "host_a",
            "Ada",
            Position::new(0, 0),
            Stats::new(3, 4, 1, 4, 0, 0),
        ))
        .multiplayer_role(MultiplayerRole::Host)
        .build(&ArmorySnapshot::new(), &BattleConfig::default())
        .expect("valid setup");
    assert_eq!(first_missing_roll(&state), Some(&id("host_a")));

    let rng = ScriptedRng::new([2]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);
    engine.execute(env, &ActionRequest::roll_initiative("host_a")).expect("host first");
    assert_eq!(first_missing_roll(engine.state()), Some(&id("guest_a")));
    engine.execute(env, &ActionRequest::roll_initiative("guest_a")).expect("then guest");
    assert_eq!(first_missing_roll(engine.state()), None);
}

/// Always asks for something illegal.
struct Stubborn;

impl EnemyDecider for Stubborn {
    fn decide(
        &self,
        _state: &BattleState,
        _env: &BattleEnv<'_>,
        enemy: &ParticipantId,
    ) -> ActionRequest {
        ActionRequest::move_to(enemy.clone(), Position::new(-5, -5))
    }
}

#[test]
fn illegal_enemy_requests_end_the_enemy_turn() {
    let mut state = crew_battle(0);
    let rng = ScriptedRng::new([3]);
    let env = BattleEnv::empty().with_rng(&rng);
    let mut engine = BattleEngine::new(&mut state);

    for roller in ["c1", "c2"] {
        engine.execute(env, &ActionRequest::roll_initiative(roller)).expect("roll");
    }
    engine.execute(env, &ActionRequest::finish_reaction_roll()).expect("finish");
    for actor in ["c1", "c2"] {
        engine.execute(env, &ActionRequest::end_turn(actor)).expect("end turn");
    }

    let report = engine
        .enemy_step(env, &Stubborn)
        .expect("fallback succeeds")
        .expect("enemy phase was running");
    assert_eq!(report.phase, BattlePhase::ReactionRoll);
    assert_eq!(engine.state().participants[2].position, Position::new(11, 7));
    assert!(engine.enemy_step(env, &Stubborn).expect("no-op").is_none());
}
