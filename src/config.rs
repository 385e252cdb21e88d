//! Configuration for the scheduling client.
//!
//! Settings are read from `.cfp/cfp.toml` and layered (file → environment →
//! CLI):
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:9000"
//! timeout_secs = 0        # 0 disables the request timeout
//!
//! [session]
//! cookie_name = "PLAY_SESSION"
//! ```
//!
//! The session cookie itself lives in `.cfp/session`, written by `signin` and
//! removed by `signout`. `CFP_SESSION_COOKIE` takes precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::SessionStore;

pub const ENV_BASE_URL: &str = "CFP_BASE_URL";
pub const ENV_SESSION_COOKIE: &str = "CFP_SESSION_COOKIE";

/// Name of the per-project configuration directory.
pub const CFP_DIR: &str = ".cfp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String {
    "PLAY_SESSION".to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

/// Raw contents of `cfp.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfpToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub session: SessionSection,
}

impl CfpToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from the project's `.cfp/cfp.toml`, or defaults if it does not exist.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CFP_DIR).join("cfp.toml");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Effective runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub session_file: PathBuf,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub cookie_name: String,
    pub session_cookie: Option<String>,
    pub verbose: bool,
}

impl Config {
    /// Build the configuration for `project_dir` using the process environment.
    pub fn new(project_dir: PathBuf, base_url: Option<String>, verbose: bool) -> Result<Self> {
        let file = CfpToml::load_or_default(&project_dir)?;
        Self::resolve(project_dir, file, |key| std::env::var(key).ok(), base_url, verbose)
    }

    /// Layer `file`, then `env`, then the CLI override.
    pub fn resolve(
        project_dir: PathBuf,
        file: CfpToml,
        env: impl Fn(&str) -> Option<String>,
        cli_base_url: Option<String>,
        verbose: bool,
    ) -> Result<Self> {
        let session_file = project_dir.join(CFP_DIR).join("session");

        let base_url = cli_base_url
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or(file.server.base_url);
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = match file.server.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let session_cookie = match env(ENV_SESSION_COOKIE) {
            Some(cookie) => Some(cookie),
            None => SessionStore::new(&session_file).load()?,
        };

        Ok(Self {
            project_dir,
            session_file,
            base_url,
            timeout,
            cookie_name: file.session.cookie_name,
            session_cookie,
            verbose,
        })
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.session_file)
    }
}
