//! `taskchord` binary: HTTP server, migrations, command registration and a
//! local chat-command runner.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use taskchord::app::{App, Storage};
use taskchord::config::AppConfig;
use taskchord::discord::{
    CommandInvocation,
    registration::{CommandRegistrar, CommandScope},
};
use taskchord::postgres::{apply_migrations, build_pool};
use taskchord::telemetry;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug, Parser)]
#[command(name = "taskchord", version, about)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the REST API and login routes.
    Serve {
        /// Keep data in process memory instead of `PostgreSQL`.
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply database migrations.
    Migrate,
    /// Register the slash commands with Discord.
    RegisterCommands {
        /// Register for one guild instead of globally.
        #[arg(long)]
        guild: Option<String>,
        /// Remove the commands instead of registering them.
        #[arg(long)]
        clear: bool,
    },
    /// Run one slash command locally and print the reply.
    #[command(name = "command")]
    Run {
        /// Guild the command runs in.
        #[arg(long)]
        guild: String,
        /// Calling user id.
        #[arg(long)]
        user: String,
        /// Calling user's display name.
        #[arg(long)]
        user_name: Option<String>,
        /// Keep data in process memory instead of `PostgreSQL`.
        #[arg(long)]
        in_memory: bool,
        /// Command text, for example `/create title="Fix bug" description=x`.
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.config.log_format).context("failed to install tracing subscriber")?;

    match cli.command {
        Command::Serve { in_memory } => serve(&cli.config, in_memory).await,
        Command::Migrate => migrate(&cli.config).await,
        Command::RegisterCommands { guild, clear } => {
            register_commands(&cli.config, guild, clear).await
        }
        Command::Run {
            guild,
            user,
            user_name,
            in_memory,
            text,
        } => {
            let app = App::build(&cli.config, storage(&cli.config, in_memory)?)?;
            let mut invocation = CommandInvocation::from_text(&text, Some(&guild), user)?;
            if let Some(name) = user_name {
                invocation = invocation.with_user_name(name);
            }
            let reply = app.commands().handle(&invocation).await;
            write!(std::io::stdout().lock(), "{reply}").context("failed to write reply")?;
            Ok(())
        }
    }
}

fn storage(config: &AppConfig, in_memory: bool) -> anyhow::Result<Storage> {
    if in_memory {
        tracing::warn!("using in-memory storage; data is lost on exit");
        return Ok(Storage::InMemory);
    }
    let pool = build_pool(config.database_url()?, config.database_pool_size)
        .context("failed to connect to PostgreSQL")?;
    Ok(Storage::Postgres(pool))
}

async fn serve(config: &AppConfig, in_memory: bool) -> anyhow::Result<()> {
    let app = App::build(config, storage(config, in_memory)?)?;
    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    tracing::info!(address = %config.bind_address, "HTTP server listening");

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = build_pool(config.database_url()?, 1).context("failed to connect to PostgreSQL")?;
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut conn = pool.get().context("failed to check out a connection")?;
        apply_migrations(&mut conn).context("migration failed")
    })
    .await
    .context("migration task panicked")??;
    tracing::info!("migrations applied");
    Ok(())
}

async fn register_commands(
    config: &AppConfig,
    guild: Option<String>,
    clear: bool,
) -> anyhow::Result<()> {
    let registrar = CommandRegistrar::new(config.bot()?);
    let scope = guild.map_or(CommandScope::Global, CommandScope::Guild);
    if clear {
        registrar.clear(&scope).await?;
    } else {
        registrar.register(&scope).await?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
