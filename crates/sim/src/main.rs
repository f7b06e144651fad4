//! Headless battle runner.
//!
//! Loads rules, armory and a scenario from the data directory, hands the
//! battle to the runtime and lets [`ClosestTargetAi`] play both sides until
//! the mission resolves or the round limit is hit. Events are streamed to
//! stdout as JSON lines; logs go to stderr.
//!
//! ```bash
//! BATTLE_SCENARIO=skirmish BATTLE_ENEMY_STEP_DELAY_MS=0 cargo run -p battle-sim
//! ```
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{ArmoryLoader, ConfigLoader, ContentFactory};
use battle_core::ai::ClosestTargetAi;
use battle_runtime::{AiCrewProvider, BattleEvent, Runtime, RuntimeConfig};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let sim_config = SimConfig::from_env();
    let runtime_config = RuntimeConfig::from_env();

    tracing::info!(
        data_dir = %sim_config.data_dir.display(),
        scenario = %sim_config.scenario,
        "starting battle simulation"
    );

    let factory = ContentFactory::new(&sim_config.data_dir);
    let battle_config = match &sim_config.rules {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let armory = match &sim_config.armory {
        Some(path) => ArmoryLoader::load(path)?,
        None => factory.load_armory()?,
    };
    let scenario = factory
        .load_scenario(&sim_config.scenario)
        .with_context(|| format!("loading scenario '{}'", sim_config.scenario))?;

    let state = scenario
        .into_setup()?
        .build(&armory, &battle_config)
        .context("deploying scenario")?;

    let armory = Arc::new(armory);
    let runtime = Runtime::builder()
        .config(runtime_config)
        .battle_config(battle_config.clone())
        .state(state)
        .armory(armory.clone())
        .build()?;

    let printer = sim_config
        .emit_events
        .then(|| spawn_printer(runtime.handle().subscribe()));

    let provider = AiCrewProvider::new(Arc::new(ClosestTargetAi), armory, battle_config);
    let outcome = runtime.run(&provider, sim_config.max_rounds).await?;

    let final_state = runtime.handle().wait_idle().await?;
    match outcome {
        Some(status) => tracing::info!(round = final_state.round, %status, "battle resolved"),
        None => tracing::warn!(
            max_rounds = sim_config.max_rounds,
            "round limit reached without a result"
        ),
    }
    for participant in &final_state.participants {
        tracing::info!(
            id = %participant.id,
            name = %participant.name,
            status = ?participant.status,
            position = ?participant.position,
            "final standing"
        );
    }

    runtime.shutdown().await?;
    if let Some(printer) = printer {
        printer.await.context("event printer panicked")?;
    }

    Ok(())
}

/// Prints events until the runtime shuts down.
fn spawn_printer(mut events: broadcast::Receiver<BattleEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("failed to encode event: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
