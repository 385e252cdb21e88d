use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "cfp-scheduler")]
#[command(version, about = "Schedule approved CFP talks into track slots")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Backend base URL. Overrides CFP_BASE_URL and cfp.toml.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exchange a Google identity token for a backend session
    Signin {
        #[arg(long, env = "CFP_ID_TOKEN")]
        id_token: String,

        /// Open the CFP home page in the browser on success
        #[arg(long)]
        open: bool,
    },
    /// Forget the stored session
    Signout,
    /// Admin dashboard of scheduled tracks
    Tracks {
        #[command(subcommand)]
        command: TracksCommands,
    },
    /// Edit the slot allocation of one track
    Slots {
        #[command(subcommand)]
        command: SlotsCommands,
    },
    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum TracksCommands {
    /// List tracks that have a schedule
    List,
    /// Delete a track's schedule (the track is kept)
    Delete { track: String },
    /// Flip a track's blocked flag
    ToggleBlocked { track: String },
}

#[derive(Subcommand, Clone)]
pub enum SlotsCommands {
    /// Show slots and unassigned talks
    Show { track: String },
    /// Put a talk into a slot and save
    Assign {
        track: String,
        talk: String,
        slot: String,
    },
    /// Take the talk at POSITION out of a slot and save
    Unassign {
        track: String,
        slot: String,
        position: usize,
    },
    /// Make a slot the stadium slot (or clear it) and save
    Stadium { track: String, slot: String },
    /// Request publication of the track's schedule
    Publish { track: String },
    /// Request the track to be unlocked
    Unlock { track: String },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cfp_scheduler=debug"
    } else {
        "cfp_scheduler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = cfp_scheduler::config::Config::new(project_dir, cli.base_url.clone(), cli.verbose)?;

    match &cli.command {
        Commands::Signin { id_token, open } => cmd::cmd_signin(&config, id_token, *open).await?,
        Commands::Signout => cmd::cmd_signout(&config).await?,
        Commands::Tracks { command } => cmd::cmd_tracks(&config, command.clone()).await?,
        Commands::Slots { command } => cmd::cmd_slots(&config, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
