//! Panchayath document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::model::{Location, LocationInput};
use crate::types::SurveyError;

/// Collection name for panchayaths
pub const PANCHAYATH_COLLECTION: &str = "panchayaths";

/// Panchayath document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PanchayathDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Public identifier (UUID string)
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub name_ml: Option<String>,

    pub ward_count: i64,
}

impl PanchayathDoc {
    pub fn new(input: LocationInput) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: Uuid::new_v4().to_string(),
            name: input.name,
            name_ml: input.name_ml,
            ward_count: i64::from(input.ward_count),
        }
    }
}

impl TryFrom<PanchayathDoc> for Location {
    type Error = SurveyError;

    fn try_from(doc: PanchayathDoc) -> Result<Self, Self::Error> {
        let ward_count = u32::try_from(doc.ward_count)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or_else(|| {
                SurveyError::InvalidRecord(format!(
                    "panchayath {} has ward_count {}",
                    doc.id, doc.ward_count
                ))
            })?;

        if doc.name.trim().is_empty() {
            return Err(SurveyError::InvalidRecord(format!(
                "panchayath {} has no name",
                doc.id
            )));
        }

        Ok(Location {
            id: doc.id,
            name: doc.name,
            name_ml: doc.name_ml.filter(|n| !n.is_empty()),
            ward_count,
        })
    }
}

impl IntoIndexes for PanchayathDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                ),
            ),
            // Names are unique by convention only; this index just serves the ordering
            (
                doc! { "name": 1 },
                Some(IndexOptions::builder().name("name_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for PanchayathDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
