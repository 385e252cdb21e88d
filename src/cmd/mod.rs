//! CLI command implementations.
//!
//! | Module   | Commands handled        |
//! |----------|-------------------------|
//! | `auth`   | `Signin`, `Signout`     |
//! | `tracks` | `Tracks`                |
//! | `slots`  | `Slots`                 |
//! | `config` | `Config`                |

pub mod auth;
pub mod config;
pub mod slots;
pub mod tracks;

pub use auth::{cmd_signin, cmd_signout};
pub use config::cmd_config;
pub use slots::cmd_slots;
pub use tracks::cmd_tracks;

use std::sync::Arc;

use anyhow::{Context, Result};
use cfp_scheduler::api::{CfpApi, CfpClient};
use cfp_scheduler::config::Config;
use cfp_scheduler::flash::{Flash, FlashLevel};
use console::style;

fn client(config: &Config) -> Result<Arc<dyn CfpApi>> {
    let api: Arc<dyn CfpApi> =
        Arc::new(CfpClient::from_config(config).context("Failed to create HTTP client")?);
    Ok(api)
}

/// Print and clear pending flash messages.
fn print_flash(flash: &mut Flash) {
    for message in flash.drain() {
        match message.level {
            FlashLevel::Info => println!("{} {}", style("✓").green(), message.text),
            FlashLevel::Error => println!("{} {}", style("✗").red(), message.text),
        }
    }
}
