//! Admin entry gate and tab selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::{Session, SessionProvider};
use crate::i18n::{Lang, Message};
use crate::notify::Notification;
use crate::store::{AppRole, RoleStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Panchayaths,
    Surveys,
    Demanded,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Panchayaths, Tab::Surveys, Tab::Demanded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Panchayaths => "panchayaths",
            Tab::Surveys => "surveys",
            Tab::Demanded => "demanded",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "panchayaths" => Ok(Tab::Panchayaths),
            "surveys" => Ok(Tab::Surveys),
            "demanded" | "demand" => Ok(Tab::Demanded),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

/// Outcome of the entry checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Session),
    Redirect {
        location: String,
        notification: Option<Notification>,
    },
}

pub struct AdminShell {
    sessions: Arc<dyn SessionProvider>,
    roles: Arc<dyn RoleStore>,
    auth_url: String,
    lang: Lang,
}

impl AdminShell {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        roles: Arc<dyn RoleStore>,
        auth_url: impl Into<String>,
        lang: Lang,
    ) -> Self {
        Self {
            sessions,
            roles,
            auth_url: auth_url.into(),
            lang,
        }
    }

    fn redirect(&self, notification: Option<Notification>) -> Access {
        Access::Redirect {
            location: self.auth_url.clone(),
            notification,
        }
    }

    /// Session first, then the admin role. Nothing renders until both pass.
    pub async fn authorize(&self, token: Option<&str>) -> Access {
        let session = match self.sessions.current_session(token).await {
            Ok(Some(session)) => session,
            Ok(None) => return self.redirect(None),
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                return self.redirect(None);
            }
        };

        let is_admin = match self.roles.has_role(&session.user_id, AppRole::Admin).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                error!("Error checking admin role for {}: {}", session.user_id, e);
                false
            }
        };

        if !is_admin {
            warn!("Denied admin access to {}", session.email);
            if let Err(e) = self.sessions.sign_out(&session).await {
                error!("Error signing out {}: {}", session.email, e);
            }
            return self.redirect(Some(Notification::error(Message::AccessDenied, self.lang)));
        }

        info!("Admin access granted to {}", session.email);
        Access::Granted(session)
    }

    pub async fn logout(&self, session: &Session) -> Access {
        if let Err(e) = self.sessions.sign_out(session).await {
            error!("Error signing out {}: {}", session.email, e);
        }
        self.redirect(Some(Notification::success(Message::LoggedOut, self.lang)))
    }
}
