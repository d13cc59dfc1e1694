use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

mod app;
mod client;
mod clipboard;
mod config;
mod form;
mod handler;
mod input;
mod logging;
mod tui;
mod ui;

use app::App;
use client::GeneratorClient;
use clipboard::SystemClipboard;
use config::{Config, Settings, SERVER_URL_ENV};
use form::EMPTY_REQUIREMENT_ERROR;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "bddgen")]
#[command(about = "Turn plain-English requirements into Gherkin feature files")]
struct Cli {
    /// Generator service URL (overrides BDDGEN_SERVER_URL and the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive requirement form (default)
    Tui,
    /// Generate a feature file once and print it
    Generate {
        /// Requirement text; use "-" to read from stdin
        requirement: Option<String>,
        /// Read the requirement from a file
        #[arg(short, long, conflicts_with = "requirement")]
        file: Option<PathBuf>,
        /// Also save the generated file into the download directory
        #[arg(short, long)]
        download: bool,
    },
    /// Check that the generator service is up
    Health,
    /// Save the generator service URL to the config file
    SetServer {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let env_server = std::env::var(SERVER_URL_ENV).ok();
    let settings = config.resolve(cli.server.as_deref(), env_server.as_deref());

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(settings).await,
        Commands::Generate { requirement, file, download } => {
            logging::init_stderr()?;
            generate_once(&settings, requirement, file, download).await
        }
        Commands::Health => {
            logging::init_stderr()?;
            check_health(&settings).await
        }
        Commands::SetServer { url } => {
            let path = Config::save_server_url(&url)?;
            println!("Saved server URL to {}", path.display());
            Ok(())
        }
    }
}

async fn run_tui(settings: Settings) -> Result<()> {
    let log_path = logging::init_file()?;
    tracing::info!(server = %settings.server_url, log = %log_path.display(), "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(settings, Box::new(SystemClipboard::new()));
    app.spawn_health_probe();

    let result = run_loop(&mut terminal, &mut app).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

fn read_requirement(requirement: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let text = match (requirement, file) {
        (_, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (Some(text), None) if text != "-" => text,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(text.trim().to_string())
}

async fn generate_once(
    settings: &Settings,
    requirement: Option<String>,
    file: Option<PathBuf>,
    download: bool,
) -> Result<()> {
    let requirement = read_requirement(requirement, file)?;
    if requirement.is_empty() {
        bail!(EMPTY_REQUIREMENT_ERROR);
    }

    let client = GeneratorClient::new(&settings.server_url);
    let generated = client.generate(&requirement).await?;
    println!("{}", generated.gherkin);

    if download {
        let path = client
            .download(&generated.filename, &settings.download_dir)
            .await
            .map_err(|e| anyhow!("Download failed: {}", e))?;
        eprintln!("Saved to {}", path.display());
    }

    Ok(())
}

async fn check_health(settings: &Settings) -> Result<()> {
    let client = GeneratorClient::new(&settings.server_url);
    let health = client.health().await?;
    match health.service {
        Some(service) => println!("{}: {}", service, health.status),
        None => println!("Service status: {}", health.status),
    }
    Ok(())
}
