use std::time::Duration;

use anyhow::Context;
use cadence_worker::queue::JobQueue;
use cadence_worker::{jobs, run_migrations, AppState, Config, WorkerError};
use sqlx::postgres::PgPoolOptions;
use sqlx::Executor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_worker=debug,cadence_mood_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| fatal(WorkerError::Configuration(format!("{e:#}"))))?;
    tracing::info!(
        environment = %config.environment(),
        queue = %config.redis().job_queue,
        "Starting Cadence worker"
    );

    let search_path = config.database().search_path();
    let pool = PgPoolOptions::new()
        .max_connections(config.database().max_connections)
        .acquire_timeout(Duration::from_secs(
            config.database().connect_timeout_secs,
        ))
        .after_connect(move |conn, _meta| {
            let statement = format!("SET search_path TO {search_path}");
            Box::pin(async move {
                conn.execute(statement.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.database().url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await.map_err(fatal)?;

    let queue = JobQueue::connect(config.redis()).await.map_err(fatal)?;
    let poll_interval = config.poll_interval();
    let state = AppState::new(pool, config);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping worker");
                break;
            }
            popped = queue.pop(poll_interval) => match popped {
                Ok(Some(payload)) => {
                    let result = jobs::handle_payload(&state, &payload).await;
                    if !result.success {
                        tracing::warn!(
                            job = %result.job,
                            retryable = result.retryable,
                            error = ?result.error_message,
                            "Job failed"
                        );
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    err.log();
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    state.db.close().await;
    Ok(())
}

/// Log a startup failure with its severity before exiting
fn fatal(err: WorkerError) -> anyhow::Error {
    err.log();
    err.into()
}
