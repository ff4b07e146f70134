//! User role document schema
//!
//! One document per (user, role) grant. User identifiers come from the
//! session provider's `sub` claim.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for role grants
pub const USER_ROLE_COLLECTION: &str = "user_roles";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRoleDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub user_id: String,

    /// `admin` or `user`
    pub role: String,
}

impl IntoIndexes for UserRoleDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "role": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_role_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UserRoleDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
