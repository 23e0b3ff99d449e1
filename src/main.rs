use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use pitch_server::config::MatchConfig;
use pitch_server::game::engine::MatchEngine;
use pitch_server::game::events::EventKind;
use pitch_server::game::match_result::determine_result;
use pitch_server::metrics::{self, Metrics};
use pitch_server::net::session::{MatchSession, NullTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Pitch Server v{}", env!("CARGO_PKG_VERSION"));

    let config = MatchConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {} Hz, {:.0}s halves, {} vs {}, x{} speed",
        config.tick_rate,
        config.half_duration,
        config.home_formation,
        config.away_formation,
        config.time_scale
    );

    let metrics = Arc::new(Metrics::new());
    let metrics_clone = metrics.clone();
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(metrics_clone, metrics_port).await {
            error!("Metrics server error: {}", e);
        }
    });

    let engine = MatchEngine::from_config(config.clone())?;
    let mut session = MatchSession::new(engine, NullTransport).with_metrics(metrics.clone());
    session.engine_mut().start_match();
    info!("Kickoff for match {}", session.engine().match_id());

    let dt = config.dt();
    let mut ticker = interval(Duration::from_secs_f32(dt / config.time_scale));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = Instant::now();
                let events = session.step(dt);
                metrics.record_tick_time(started.elapsed());

                for event in &events {
                    if let EventKind::OutOfBounds { kind, .. } = &event.kind {
                        debug!("Ball out ({:?}) at {:.1}s", kind, event.game_time);
                    }
                }

                if session.is_finished() {
                    break;
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    let statistics = session.engine().statistics();
    let outcome = determine_result(&statistics);
    session.shutdown();

    let report = serde_json::json!({
        "statistics": statistics,
        "result": outcome,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Server stopped");
    Ok(())
}
