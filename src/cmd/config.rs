//! Configuration view: `cfp-scheduler config`.

use anyhow::Result;
use cfp_scheduler::config::{CFP_DIR, Config, ENV_BASE_URL, ENV_SESSION_COOKIE};

use super::super::ConfigCommands;

pub fn cmd_config(config: &Config, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config_path = config.project_dir.join(CFP_DIR).join("cfp.toml");
            println!();
            println!("CFP Scheduler Configuration");
            println!("===========================");
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No cfp.toml found at {}", config_path.display());
                println!("Using defaults ({} / {} override).", ENV_BASE_URL, ENV_SESSION_COOKIE);
            }
            println!();
            println!("Effective values:");
            println!("  base_url = \"{}\"", config.base_url);
            match config.timeout {
                Some(timeout) => println!("  timeout_secs = {}", timeout.as_secs()),
                None => println!("  timeout_secs = 0 (disabled)"),
            }
            println!("  cookie_name = \"{}\"", config.cookie_name);
            println!(
                "  signed_in = {}",
                if config.session_cookie.is_some() { "yes" } else { "no" }
            );
            println!();
        }
    }
    Ok(())
}
