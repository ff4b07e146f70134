//! Session provider
//!
//! The admin shell asks this provider for the current session and asks it to
//! sign out. The JWT implementation keeps revoked token ids until their
//! natural expiry so a signed-out token stops working immediately.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use super::jwt::{unix_now, JwtValidator, TokenInput};
use crate::config::Args;
use crate::types::{Result, SurveyError};

/// An active, verified session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(skip)]
    pub token_id: String,
    pub expires_at: u64,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the session carried by `token`, if it is active
    async fn current_session(&self, token: Option<&str>) -> Result<Option<Session>>;

    /// Invalidate the session
    async fn sign_out(&self, session: &Session) -> Result<()>;
}

pub struct JwtSessionProvider {
    jwt: JwtValidator,
    /// Revoked token id -> expiry (Unix seconds)
    revoked: DashMap<String, u64>,
}

impl JwtSessionProvider {
    pub fn new(jwt: JwtValidator) -> Self {
        Self {
            jwt,
            revoked: DashMap::new(),
        }
    }

    /// Build from configuration. Dev mode without a secret uses the fixed dev secret.
    pub fn from_args(args: &Args) -> Result<Self> {
        let jwt = match (&args.jwt_secret, args.dev_mode) {
            (Some(secret), _) => JwtValidator::new(secret.clone(), args.jwt_expiry_seconds)?,
            (None, true) => JwtValidator::new_dev(),
            (None, false) => {
                return Err(SurveyError::Config(
                    "JWT_SECRET is required in production mode".into(),
                ))
            }
        };
        Ok(Self::new(jwt))
    }

    /// Issue a token for a user (dev mode and tests)
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        self.jwt.generate_token(TokenInput {
            user_id: user_id.to_string(),
            email: email.to_string(),
        })
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    fn purge_expired(&self, now: u64) {
        self.revoked.retain(|_, exp| *exp > now);
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn current_session(&self, token: Option<&str>) -> Result<Option<Session>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let result = self.jwt.verify_token(token);
        let Some(claims) = result.claims.filter(|_| result.valid) else {
            debug!(
                "Rejected session token: {}",
                result.error.as_deref().unwrap_or("invalid")
            );
            return Ok(None);
        };

        if self.revoked.contains_key(&claims.jti) {
            debug!("Rejected revoked session token for {}", claims.sub);
            return Ok(None);
        }

        Ok(Some(Session {
            user_id: claims.sub,
            email: claims.email,
            token_id: claims.jti,
            expires_at: claims.exp,
        }))
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let now = unix_now()?;
        self.purge_expired(now);
        self.revoked
            .insert(session.token_id.clone(), session.expires_at);
        info!("Signed out {}", session.email);
        Ok(())
    }
}
