//! Configuration for the survey service
//!
//! CLI arguments with environment variable fallbacks, read after `.env`.

use clap::Parser;
use std::net::SocketAddr;

use crate::i18n::Lang;

/// Panchayath survey service
///
/// Serves the public bilingual survey form and the admin dashboard.
#[derive(Parser, Debug, Clone)]
#[command(name = "panchayath-survey")]
#[command(about = "Panchayath product and service demand survey")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (fixed JWT secret, in-memory store fallback)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "panchayath_survey")]
    pub mongodb_db: String,

    /// Secret shared with the authentication service (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Lifetime of tokens issued in dev mode
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Where unauthenticated admin visitors are sent
    #[arg(long, env = "AUTH_URL", default_value = "/auth")]
    pub auth_url: String,

    /// Language of the public form when the request names none (ml, en)
    #[arg(long, env = "DEFAULT_LANG", default_value = "ml")]
    pub default_lang: Lang,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.jwt_secret {
                None => return Err("JWT_SECRET is required in production mode".to_string()),
                Some(secret) if secret.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string())
                }
                Some(_) => {}
            }
        }

        if self.auth_url.trim().is_empty() {
            return Err("AUTH_URL must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["panchayath-survey"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_dev_mode_needs_no_secret() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_long_secret() {
        let args = parse(&["--jwt-secret", "short"]);
        assert!(args.validate().is_err());

        let secret = "s".repeat(32);
        let args = parse(&["--jwt-secret", &secret, "--auth-url", "/login"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.auth_url, "/login");
    }

    #[test]
    fn test_default_lang_parses() {
        let args = parse(&["--dev-mode", "--default-lang", "en"]);
        assert_eq!(args.default_lang, Lang::En);
    }
}
