//! Admin dashboard: `cfp-scheduler tracks`.

use anyhow::Result;
use cfp_scheduler::config::Config;
use cfp_scheduler::controllers::TrackList;
use console::style;

use super::super::TracksCommands;
use super::{client, print_flash};

pub async fn cmd_tracks(config: &Config, command: TracksCommands) -> Result<()> {
    let mut list = TrackList::new(client(config)?);
    list.load().await?;

    match command {
        TracksCommands::List => {
            if list.tracks().is_empty() {
                println!("No scheduled tracks.");
                return Ok(());
            }
            for track in list.tracks() {
                let status = if track.blocked {
                    style("blocked").red()
                } else {
                    style("open").green()
                };
                println!("  {:<20} {:<30} {}", track.id, track.label, status);
            }
        }
        TracksCommands::Delete { track } => {
            let result = list.delete_schedule(&track).await;
            print_flash(list.flash_mut());
            result?;
        }
        TracksCommands::ToggleBlocked { track } => {
            let blocked = list.toggle_blocked_status(&track).await?;
            println!(
                "Track {} is now {}",
                track,
                if blocked { "blocked" } else { "open" }
            );
        }
    }
    Ok(())
}
