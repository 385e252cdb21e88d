//! Transient user-facing messages ("Allocation saved", "Unauthorized", ...).

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Queue of messages waiting to be shown.
#[derive(Debug, Clone, Default)]
pub struct Flash {
    messages: Vec<FlashMessage>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(FlashLevel::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(FlashLevel::Error, text.into());
    }

    fn push(&mut self, level: FlashLevel, text: String) {
        self.messages.push(FlashMessage {
            level,
            text,
            at: Utc::now(),
        });
    }

    /// Most recent message, if any.
    pub fn latest(&self) -> Option<&FlashMessage> {
        self.messages.last()
    }

    /// Take every pending message, oldest first.
    pub fn drain(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
