//! Admin dashboard
//!
//! Everything here sits behind [`AdminShell`]: the shell checks the session
//! and the admin role, then the three tab components do their own reads and
//! writes through the store traits. Admin text defaults to English.

pub mod browser;
pub mod demand;
pub mod locations;
pub mod shell;

use serde::Serialize;

use crate::i18n::{Lang, Message};
use crate::notify::Notification;

pub use browser::{BrowserStats, ResponseBrowser, SurveyEntry};
pub use demand::{aggregate, DemandAggregator, DemandEntry};
pub use locations::ReferenceDataManager;
pub use shell::{Access, AdminShell, Tab};

/// Result of a mutating admin action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// `refresh` carries the failed re-read that followed a successful write
    Done {
        notification: Notification,
        #[serde(skip_serializing_if = "Option::is_none")]
        refresh: Option<Notification>,
    },
    Failed { notification: Notification },
    /// Deletes wait for an explicit confirmation; nothing was sent to the store
    ConfirmationRequired { prompt: String },
}

impl ActionOutcome {
    pub(crate) fn done(message: Message, lang: Lang, refresh: Option<Notification>) -> Self {
        ActionOutcome::Done {
            notification: Notification::success(message, lang),
            refresh,
        }
    }

    pub(crate) fn failed(message: Message, lang: Lang) -> Self {
        ActionOutcome::Failed {
            notification: Notification::error(message, lang),
        }
    }

    pub(crate) fn confirm(message: Message, lang: Lang) -> Self {
        ActionOutcome::ConfirmationRequired {
            prompt: message.text(lang).to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done { .. })
    }

    pub fn notification(&self) -> Option<&Notification> {
        match self {
            ActionOutcome::Done { notification, .. } | ActionOutcome::Failed { notification } => {
                Some(notification)
            }
            ActionOutcome::ConfirmationRequired { .. } => None,
        }
    }

    /// Error from the re-read after a successful write, if it failed
    pub fn refresh(&self) -> Option<&Notification> {
        match self {
            ActionOutcome::Done { refresh, .. } => refresh.as_ref(),
            _ => None,
        }
    }
}
