//! MediRAG CLI and REST API entry point.
//!
//! Binary name: `medirag`
//!
//! Parses CLI arguments, sets up tracing, wires storage and services, then
//! dispatches to the matching command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    medirag_observe::tracing_setup::init_tracing(cli.verbose, cli.quiet, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "medirag", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = medirag_infra::config::resolve_data_dir(cli.data_dir.clone());
    let state = AppState::init(data_dir).await?;

    let result = run(state, cli).await;
    medirag_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(state: AppState, cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Chat { session, user } => {
            cli::chat::loop_runner::run_chat_loop(&state, session, user).await?;
        }

        Commands::Ask {
            message,
            session,
            user,
        } => {
            cli::ask::ask(&state, &message, session, user, json).await?;
        }

        Commands::Kb { action } => cli::kb::run(&state, action, json).await?,

        Commands::Memory { action } => cli::memory::run(&state, action, json).await?,

        Commands::Evaluate {
            export,
            history,
            clear_history,
        } => {
            cli::evaluate::run(&state, export.as_deref(), history, clear_history, json).await?;
        }

        Commands::Stats => cli::system::stats(&state, json).await?,

        Commands::Performance => cli::system::performance(&state, json).await?,

        Commands::Export { path } => cli::system::export(&state, &path, json).await?,

        Commands::Reset { yes } => cli::system::reset(&state, yes, json).await?,

        Commands::Serve { port, host } => {
            state.ensure_knowledge().await?;

            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(addr = %addr, "REST API listening");

            if !cli.quiet {
                println!(
                    "  {} MediRAG API listening on {}",
                    console::style("*").green().bold(),
                    console::style(format!("http://{addr}/api/v1")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
