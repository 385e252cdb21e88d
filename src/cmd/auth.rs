//! Sign-in and sign-out: `cfp-scheduler signin` / `signout`.

use anyhow::Result;
use cfp_scheduler::api::CfpClient;
use cfp_scheduler::auth::{AuthBridge, GoogleIdentity, SignInOutcome};
use cfp_scheduler::config::Config;
use console::style;

pub async fn cmd_signin(config: &Config, id_token: &str, open: bool) -> Result<()> {
    let api = CfpClient::from_config(config)?;
    let store = config.session_store();
    let bridge = AuthBridge::new(&api, &store);

    let identity = (!id_token.trim().is_empty()).then(|| GoogleIdentity::from_token(id_token.trim()));
    match bridge.on_sign_in(identity.as_ref()).await? {
        SignInOutcome::Redirect { to, session_cookie } => {
            match session_cookie {
                Some(cookie) => store.save(&cookie)?,
                None => tracing::warn!("Backend accepted the token but set no session cookie"),
            }
            let url = format!("{}{}", config.base_url, to);
            println!("{} Signed in. Continue at {}", style("✓").green(), url);
            if open {
                if let Err(e) = open::that(&url) {
                    eprintln!("Failed to open browser: {}", e);
                }
            }
        }
        SignInOutcome::Rejected { status } => {
            println!("{} Sign in failed ({})", style("✗").red(), status);
        }
        SignInOutcome::NoUser => {
            println!("{} No identity token given", style("✗").red());
        }
    }
    Ok(())
}

pub async fn cmd_signout(config: &Config) -> Result<()> {
    let api = CfpClient::from_config(config)?;
    let store = config.session_store();
    AuthBridge::new(&api, &store).sign_out().await?;
    println!("Signed out.");
    Ok(())
}
