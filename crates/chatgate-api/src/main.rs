//! Chatgate entry point.
//!
//! Binary name: `chatgate`
//!
//! Loads configuration from the environment, connects the MySQL pool when
//! one is configured, verifies the schema, then serves the REST API until
//! Ctrl+C or SIGTERM. Without database settings the server still starts;
//! conversation routes answer 503 and chat keeps working.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;

use chatgate_core::startup::verify_tables;
use chatgate_infra::config::GatewayConfig;
use chatgate_infra::mysql::pool::DatabasePool;
use chatgate_infra::mysql::schema::MySqlSchemaInspector;
use chatgate_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(TracingOptions {
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = GatewayConfig::from_env();
    let result = run(cli.command, &config).await;

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "Chatgate exited with an error");
    }
    shutdown_tracing();
    result
}

async fn run(command: Commands, config: &GatewayConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => serve(config, &host, port).await,
        Commands::Verify => {
            let pool = DatabasePool::connect(&config.database)
                .await
                .context("failed to connect to MySQL")?
                .ok_or_else(|| anyhow::anyhow!("MySQL is not configured; set MYSQL_HOST and MYSQL_USER"))?;
            let verified = verify_tables(&MySqlSchemaInspector::new(pool.clone())).await;
            pool.close().await?;
            verified?;
            tracing::info!("Database schema verified");
            Ok(())
        }
    }
}

async fn serve(config: &GatewayConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("failed to connect to MySQL")?;

    match &pool {
        Some(pool) => {
            verify_tables(&MySqlSchemaInspector::new(pool.clone()))
                .await
                .context("database schema verification failed")?;
            tracing::info!(database = pool.database().unwrap_or_default(), "Database schema verified");
        }
        None => {
            tracing::warn!("Skipping table verification because the database is not configured");
        }
    }

    let state = ServerState::from_config(config, pool.clone());
    let router = http::router::build_router(state, &config.routes);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        conversation_base = %config.routes.conversation_base,
        chat_path = %config.routes.chat_path,
        "Chatgate listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    if let Some(pool) = pool {
        pool.close().await?;
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
