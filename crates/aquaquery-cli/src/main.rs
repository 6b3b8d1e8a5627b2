//! CLI entry point for AquaQuery.
//!
//! This binary provides the `aquaquery` command with subcommands for the
//! interactive loop, one-shot questions, the HTTP server and a status
//! summary.

mod cli;
mod helpers;
mod repl;

use anyhow::{Context, Result};
use aquaquery_engine::EngineConfig;
use aquaquery_web::{WebConfig, WebServer};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::helpers::{build_engine, format_result, init_tracing, load_config};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_tracing(&config.logging);
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }
    debug!(config = %cli.config.display(), "configuration resolved");

    match cli.command {
        Commands::Repl { session } => {
            let engine = build_engine(&config)?;
            repl::cmd_repl(&engine, &session)
        }
        Commands::Ask {
            text,
            session,
            json,
        } => cmd_ask(&config, &text.join(" "), session.as_deref(), json),
        Commands::Serve { bind, port } => cmd_serve(config, bind, port).await,
        Commands::Status => cmd_status(&config),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: ask
// ---------------------------------------------------------------------------

fn cmd_ask(config: &EngineConfig, question: &str, session: Option<&str>, json: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let result = engine.process_query(question, session);

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{rendered}");
    } else {
        println!("{}", format_result(&result));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: serve
// ---------------------------------------------------------------------------

async fn cmd_serve(mut config: EngineConfig, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_addr = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let engine = build_engine(&config)?;
    let server = WebServer::new(WebConfig::from(&config), engine);
    let addr = server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!("  AquaQuery API listening on http://{addr}");
    server
        .serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .context("web server failed")
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

fn cmd_status(config: &EngineConfig) -> Result<()> {
    let engine = build_engine(config)?;
    let dataset = engine.dataset();

    println!("AquaQuery v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  Intents:          {}", aquaquery_intent::Intent::ALL.len());
    println!("  Scored patterns:  {}", engine.scorer().patterns().len());
    println!();
    println!("  Dataset");
    println!("    States:             {}", dataset.total_states());
    println!("    Assessments:        {}", dataset.total_assessments());
    println!("    Stressed units:     {}", dataset.critical_block_count());
    if let Some(year) = dataset.latest_year() {
        println!("    Latest assessment:  {year}");
    }
    println!();
    println!("  Configuration");
    println!(
        "    Cache:     {} (capacity {}, ttl {}s)",
        if config.cache.enabled { "enabled" } else { "disabled" },
        config.cache.capacity,
        config.cache.ttl_secs
    );
    println!("    History:   {} utterances", config.context.history_capacity);
    println!(
        "    Server:    {}:{}",
        config.server.bind_addr, config.server.port
    );
    println!("    Log level: {}", config.logging.level);
    Ok(())
}
