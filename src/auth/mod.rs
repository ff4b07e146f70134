//! Authentication for the admin dashboard
//!
//! Provides:
//! - JWT session token validation (tokens come from the external auth service)
//! - The session provider the admin shell consults and signs out through

pub mod jwt;
pub mod session;

pub use jwt::{
    extract_token_from_cookie, extract_token_from_header, Claims, JwtValidator, TokenInput,
    TokenValidationResult,
};
pub use session::{JwtSessionProvider, Session, SessionProvider};
