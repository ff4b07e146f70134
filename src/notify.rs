//! Transient user-facing notifications (toasts)

use serde::Serialize;

use crate::i18n::{Lang, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// One notification per operation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: Message, lang: Lang) -> Self {
        Self {
            level: Level::Success,
            message: message.text(lang).to_string(),
        }
    }

    pub fn error(message: Message, lang: Lang) -> Self {
        Self {
            level: Level::Error,
            message: message.text(lang).to_string(),
        }
    }

    /// Error carrying free text, e.g. a store message shown to an administrator
    pub fn error_text(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}
