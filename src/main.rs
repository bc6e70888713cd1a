//! Fund Transfer API - service entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────┐    ┌──────────┐
//! │  Config  │───▶│ Postgres │───▶│ Pipeline  │───▶│ Gateway  │
//! │  (YAML)  │    │  (pool)  │    │ (schema,  │    │  (axum)  │
//! └──────────┘    └──────────┘    │ template) │    └──────────┘
//!                                 └───────────┘
//! ```
//!
//! Usage: `fund-transfer-api [--env <name>] [--port <port>]`

use std::sync::Arc;

use anyhow::Context;

use fund_transfer_api::config::AppConfig;
use fund_transfer_api::db::Database;
use fund_transfer_api::gateway;
use fund_transfer_api::transaction::{
    PgTransactionRepository, ResponseTemplate, SchemaValidator, TransactionPipeline,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn build_pipeline(config: &AppConfig, db: &Database) -> anyhow::Result<TransactionPipeline> {
    let validator = SchemaValidator::load(&config.pipeline.schema_path)
        .context("Failed to load transaction schema")?;

    let template = match &config.pipeline.template_path {
        Some(path) => ResponseTemplate::load(path).context("Failed to load response template")?,
        None => {
            tracing::info!("No template_path configured, using built-in response template");
            ResponseTemplate::builtin()
        }
    };

    let repository =
        PgTransactionRepository::new(db.pool().clone(), config.pipeline.transaction_mode);
    tracing::info!(
        "Transaction mode: {:?}",
        config.pipeline.transaction_mode
    );

    Ok(TransactionPipeline::new(
        Arc::new(validator),
        Arc::new(repository),
        Arc::new(template),
    ))
}

async fn serve(mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.health_check()
        .await
        .context("PostgreSQL health check failed")?;
    if config.database.init_schema {
        db.init_schema()
            .await
            .context("Failed to create transactions table")?;
    }

    let pipeline = build_pipeline(&config, &db)?;
    gateway::run_server(&config.gateway, Arc::new(pipeline))
        .await
        .context("Gateway stopped")?;
    Ok(())
}

fn main() {
    let env = get_env();
    let app_config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ FATAL: {}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = match fund_transfer_api::logging::init_logging(&app_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Starting fund-transfer-api {} (build {}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_REV"),
        env
    );

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")
        .and_then(|rt| rt.block_on(serve(app_config)));

    if let Err(e) = result {
        tracing::error!("FATAL: {:#}", e);
        eprintln!("❌ FATAL: {:#}", e);
        std::process::exit(1);
    }
}
