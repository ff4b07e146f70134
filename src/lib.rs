//! Panchayath survey service
//!
//! Collects which products and services residents of a panchayath want, and
//! gives administrators a dashboard over the answers.
//!
//! ## Components
//!
//! - **Submission form** ([`survey`]): bilingual public form, validation and
//!   the header-then-items write
//! - **Reference data manager** ([`admin::locations`]): panchayath CRUD
//! - **Response browser** ([`admin::browser`]): responses with their items
//! - **Demand aggregator** ([`admin::demand`]): ranked products and services
//! - **Admin shell** ([`admin::shell`]): session and role gate
//!
//! Storage sits behind the traits in [`store`], backed by MongoDB or by the
//! in-memory store.

pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod i18n;
pub mod model;
pub mod notify;
pub mod routes;
pub mod server;
pub mod store;
pub mod survey;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, SurveyError};
