use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod io;
mod profile;
mod render;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::controller::{AppController, annotate_once, start_session};
use self::render::append_paragraphs;
use self::state::AppState;

#[derive(Parser)]
#[command(name = "kieli", version, about = "Swap known words for the language you are learning")]
struct Cli {
    /// Profile name under the kieli config folder
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Vocabulary JSON file, overrides the profile
    #[arg(long, global = true)]
    vocab: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a file once and print it
    Annotate { file: PathBuf },
    /// Live session: stdin lines are appended, `:` lines are commands
    Watch { file: Option<PathBuf> },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = profile::load_config(cli.profile.as_deref())?;
    if let Some(path) = &cli.vocab {
        config.vocabulary.path = Some(path.display().to_string());
    }
    let state = Arc::new(AppState::new(config)?);

    match cli.command {
        Command::Annotate { file } => {
            let text = std::fs::read_to_string(&file)?;
            let (output, report) = annotate_once(&state, &text).await?;
            println!("{output}");
            tracing::info!("Replaced {} words: {:?}", report.markers, report.counts);
        }
        Command::Watch { file } => {
            if let Some(file) = file {
                let text = std::fs::read_to_string(&file)?;
                let mut doc = state.document.write().await;
                append_paragraphs(&mut doc, state.region, &text)?;
            }
            watch(state).await;
        }
    }

    Ok(())
}

async fn watch(state: Arc<AppState>) {
    let session = start_session(&state).await;
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(session);

    let cancel = controller.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task exited: {e}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }

    ctrl_c.abort();
    controller.shutdown();
}
