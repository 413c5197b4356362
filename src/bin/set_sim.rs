//! Headless simulation: every seat is automated and display output goes to
//! the log. Configure with `SET_*` variables and `RUST_LOG`.
//!
//! `SET_MAX_SECONDS` stops the game early after that many seconds.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use set_engine::{Dealer, FeatureOracle, GameConfig, GameOutcome, TracingDisplay};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = GameConfig::from_env();
    config.human_players = 0;
    config.validate().context("invalid configuration")?;

    let oracle = Arc::new(FeatureOracle::new(config.feature_size, config.feature_count));
    let dealer = Dealer::new(config, oracle, Arc::new(TracingDisplay))
        .context("failed to set up the game")?;

    if let Some(limit) = max_duration() {
        let handle = dealer.handle();
        thread::Builder::new()
            .name("time-limit".into())
            .spawn(move || {
                thread::sleep(limit);
                tracing::warn!(?limit, "time limit reached");
                handle.request_termination();
            })
            .context("failed to spawn time-limit thread")?;
    }

    let outcome = dealer.run();
    for (player, score) in outcome.scores().iter() {
        println!("{player}: {score}");
    }
    match &outcome {
        GameOutcome::Finished { winners, .. } => {
            let names: Vec<String> = winners.iter().map(ToString::to_string).collect();
            println!("winners: {}", names.join(", "));
        }
        GameOutcome::Terminated { .. } => println!("terminated before the deck ran out"),
    }
    Ok(())
}

fn max_duration() -> Option<Duration> {
    std::env::var("SET_MAX_SECONDS")
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
