//! Federated sign-in bridge.
//!
//! A Google identity token is exchanged with the backend at `/gtokensignin`.
//! On acceptance the caller is sent to the CFP home page; any other answer is
//! logged and leaves the caller where it was.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::CfpApi;
use crate::errors::ClientError;

/// Where a successful sign-in lands.
pub const HOME_PATH: &str = "/cfp/home";

/// Basic profile attached to a signed-in Google identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicProfile {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub email: String,
}

/// Result handed over by the identity provider after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleIdentity {
    pub id_token: String,
    pub profile: Option<BasicProfile>,
}

impl GoogleIdentity {
    pub fn from_token(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Backend accepted the token; navigate to `to`.
    Redirect {
        to: String,
        session_cookie: Option<String>,
    },
    /// Backend answered with something other than 200.
    Rejected { status: u16 },
    /// No identity was available.
    NoUser,
}

/// The identity provider's client-side session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_out(&self) -> Result<()>;
}

/// Session cookie persisted between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let value = content.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    pub fn save(&self, cookie: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        std::fs::write(&self.path, cookie)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove session file {}", self.path.display())),
        }
    }
}

#[async_trait]
impl IdentityProvider for SessionStore {
    async fn sign_out(&self) -> Result<()> {
        self.clear()?;
        tracing::info!("User signed out");
        Ok(())
    }
}

pub struct AuthBridge<'a, A: CfpApi + ?Sized, P: IdentityProvider + ?Sized> {
    api: &'a A,
    provider: &'a P,
}

impl<'a, A: CfpApi + ?Sized, P: IdentityProvider + ?Sized> AuthBridge<'a, A, P> {
    pub fn new(api: &'a A, provider: &'a P) -> Self {
        Self { api, provider }
    }

    pub async fn on_sign_in(
        &self,
        identity: Option<&GoogleIdentity>,
    ) -> Result<SignInOutcome, ClientError> {
        let Some(identity) = identity else {
            tracing::info!("No google user in context");
            return Ok(SignInOutcome::NoUser);
        };

        if let Some(profile) = &identity.profile {
            tracing::debug!(
                id = %profile.id,
                name = %profile.name,
                email = %profile.email,
                image_url = profile.image_url.as_deref().unwrap_or(""),
                "Signing in"
            );
        }

        let exchange = self.api.exchange_id_token(&identity.id_token).await?;
        if exchange.accepted() {
            tracing::info!("Google sign in success");
            Ok(SignInOutcome::Redirect {
                to: HOME_PATH.to_string(),
                session_cookie: exchange.session_cookie,
            })
        } else {
            tracing::warn!(status = exchange.status, "Google sign in failed");
            Ok(SignInOutcome::Rejected {
                status: exchange.status,
            })
        }
    }

    /// Sign out with the identity provider. The backend is not contacted.
    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await
    }
}
