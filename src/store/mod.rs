//! Backend store seams
//!
//! The survey tables live in a hosted backend. Components only ever see these
//! traits; the entry point decides whether they are backed by MongoDB or by
//! the in-memory store.
//!
//! - [`LocationStore`]: the `panchayaths` table
//! - [`ResponseStore`]: the `surveys` and `survey_items` tables
//! - [`RoleStore`]: the `user_roles` table

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{
    ItemLabel, Location, LocationInput, NewLineItem, NewResponseHeader, ResponseHeader,
    ResponseLineItem,
};
use crate::types::Result;

pub use memory::{MemoryStore, StoreOp};
pub use mongo::MongoSurveyStore;

/// Authorization roles held in the role table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::User => "user",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panchayath reference data
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// All locations ordered by name ascending
    async fn list_locations(&self) -> Result<Vec<Location>>;

    async fn insert_location(&self, input: LocationInput) -> Result<Location>;

    /// Replace the editable fields of the location with this identifier
    async fn update_location(&self, id: &str, input: LocationInput) -> Result<()>;

    async fn delete_location(&self, id: &str) -> Result<()>;
}

/// Survey headers and their line items
///
/// Headers and items are independent tables: deleting a header leaves its
/// items in place.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Insert a header; the store assigns identifier and creation time
    async fn insert_header(&self, header: NewResponseHeader) -> Result<ResponseHeader>;

    /// Insert line items in one write
    async fn insert_items(&self, items: Vec<NewLineItem>) -> Result<Vec<ResponseLineItem>>;

    /// All headers ordered by creation time, newest first
    async fn list_headers(&self) -> Result<Vec<ResponseHeader>>;

    /// Items whose header identifier equals `header_id`
    async fn items_for_header(&self, header_id: &str) -> Result<Vec<ResponseLineItem>>;

    /// Label and category of every stored item, in insertion order
    async fn list_item_labels(&self) -> Result<Vec<ItemLabel>>;

    async fn delete_header(&self, id: &str) -> Result<()>;
}

/// Role grants keyed by user identifier
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool>;
}
