//! DocSync - headless document synchronization
//!
//! Usage: `docsync [health|start-day|resume|cancel|status|reset]`
//!
//! Configuration comes from `DOCSYNC_*` environment variables (a `.env` file
//! is honoured) or a probed `config.{json,toml}` / `docsync.{json,toml}`.

use anyhow::{anyhow, bail, Context};
use docsync_infra::config;
use docsync_lib::utils::logging::init_tracing;
use docsync_lib::{commands, AppContext};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Health,
    StartDay,
    Resume,
    Cancel,
    Status,
    Reset,
}

impl Command {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        Ok(match arg {
            None | Some("health") => Self::Health,
            Some("start-day") => Self::StartDay,
            Some("resume") => Self::Resume,
            Some("cancel") => Self::Cancel,
            Some("status") => Self::Status,
            Some("reset") => Self::Reset,
            Some(other) => bail!(
                "unknown command '{other}' (expected health, start-day, resume, cancel, status, reset)"
            ),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first so the loader sees `.env` values
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging).map_err(|e| anyhow!("failed to initialise tracing: {e}"))?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    let command = Command::parse(std::env::args().nth(1).as_deref())?;
    let ctx = AppContext::new_with_config(config).await.context("failed to create context")?;

    let health = ctx.boot().await;
    let outcome = tokio::select! {
        outcome = run(&ctx, command, health) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; run `docsync resume` to finish the batch");
            Ok(())
        }
    };

    ctx.shutdown().await?;
    outcome
}

async fn run(
    ctx: &AppContext,
    command: Command,
    health: docsync_domain::HealthCheckResult,
) -> anyhow::Result<()> {
    match command {
        Command::Health => print_json(&health),
        Command::StartDay | Command::Resume => {
            let _progress = commands::subscribe_sync(ctx, |state| {
                info!(
                    status = %state.status,
                    completed = state.completed,
                    failed = state.failed,
                    total = state.total,
                    current = state.current_item.as_deref().unwrap_or_default(),
                    "Sync progress"
                );
            });

            let state = if command == Command::StartDay {
                commands::start_day(ctx).await
            } else {
                commands::resume_batch(ctx).await
            }
            .map_err(|e| anyhow!(e))?;
            print_json(&state)
        }
        Command::Cancel => {
            commands::cancel_sync(ctx).await.map_err(|e| anyhow!(e))?;
            print_json(&commands::get_sync_state(ctx))
        }
        Command::Status => {
            let counters = commands::get_session_counters(ctx).await.map_err(|e| anyhow!(e))?;
            print_json(&counters)
        }
        Command::Reset => {
            let health = commands::reset_storage(ctx).await.map_err(|e| anyhow!(e))?;
            print_json(&health)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
