//! Add-on Dev Tools
//!
//! Entry point for the `addon-devtools` command.

use addon_devtools::bootstrap::{session_token_slot, DevToolsNamespace, SessionBootstrap};
use addon_devtools::cli::{run_config_command, Cli, Commands, InitSinkArgs};
use addon_devtools::errors::DevToolsError;
use addon_devtools::observability::{env_filter, DEFAULT_LOG_FILTER};
use addon_devtools::routes::{self, AppState};
use anyhow::Context;
use clap::Parser;
use common::config::ObservabilityConfig;
use common::store::{ConfigStore, FileStore};
use std::io::Write;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<DevToolsError>()
                .map_or(1, DevToolsError::exit_code);
            eprintln!("error: {err:#}");
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so stdout stays clean for command output.
fn init_tracing() {
    let observability = ObservabilityConfig::from_env(DEFAULT_LOG_FILTER);
    let registry = tracing_subscriber::registry().with(env_filter(&observability));

    if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store: Arc<dyn ConfigStore> = Arc::new(FileStore::new(cli.store.clone()));

    match cli.command {
        Commands::Config { cmd } => {
            let mut stdout = std::io::stdout().lock();
            run_config_command(store.as_ref(), &cmd, &mut stdout)?;
        }
        Commands::Token { init } => token(store, &init).await?,
        Commands::Serve { bind, init } => serve(store, bind, &init).await?,
    }
    Ok(())
}

fn bootstrap(
    store: Arc<dyn ConfigStore>,
    init: &InitSinkArgs,
    stdout_reserved: bool,
) -> Result<SessionBootstrap, DevToolsError> {
    let bootstrap = SessionBootstrap::new(store);
    Ok(match init.host_sdk(stdout_reserved)? {
        Some(host_sdk) => bootstrap.with_host_sdk(host_sdk),
        None => bootstrap,
    })
}

async fn token(store: Arc<dyn ConfigStore>, init: &InitSinkArgs) -> anyhow::Result<()> {
    let (resolver, _handle) = session_token_slot();
    // stdout carries the session token JSON
    let outcome = bootstrap(store, init, true)?.run(resolver).await?;

    let rendered = serde_json::to_string_pretty(outcome.session.as_ref())
        .context("Failed to serialize session token")?;
    writeln!(std::io::stdout().lock(), "{rendered}").context("Failed to write session token")?;
    Ok(())
}

async fn serve(
    store: Arc<dyn ConfigStore>,
    bind: SocketAddr,
    init: &InitSinkArgs,
) -> anyhow::Result<()> {
    let bootstrap = bootstrap(store, init, false)?;
    let (resolver, handle) = session_token_slot();

    let state = Arc::new(AppState {
        namespace: DevToolsNamespace::new(handle),
    });
    let app = routes::build_routes(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Handle server listening on {}", bind);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    let bootstrap_result = bootstrap.run(resolver).await;
    match &bootstrap_result {
        Ok(outcome) => info!(
            resource_id = %outcome.session.resource_id,
            "Session token ready at /devtools/session-token"
        ),
        Err(e) => error!(
            "Bootstrap failed, session token requests will return 503: {}",
            e
        ),
    }

    server
        .await
        .context("Handle server task failed")?
        .context("Handle server error")?;

    info!("Handle server shutdown complete");
    bootstrap_result?;
    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
