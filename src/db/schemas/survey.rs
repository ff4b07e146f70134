//! Survey header and survey item document schemas
//!
//! Headers and items live in separate collections linked by `survey_id`.
//! There is no cascade between them.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::model::{
    Category, ItemLabel, NewLineItem, NewResponseHeader, ResponseHeader, ResponseLineItem, Role,
};
use crate::types::SurveyError;

/// Collection name for survey headers
pub const SURVEY_COLLECTION: &str = "surveys";

/// Collection name for survey items
pub const SURVEY_ITEM_COLLECTION: &str = "survey_items";

/// Survey header document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SurveyDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub id: String,

    /// Respondent name
    pub name: String,

    pub mobile: String,

    /// Panchayath name as chosen in the form
    pub panchayath: String,

    pub ward: String,

    /// `respondent` or `agent` (`customer` in older rows)
    pub user_type: String,

    pub created_at: DateTime,
}

impl SurveyDoc {
    pub fn new(header: NewResponseHeader) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: Uuid::new_v4().to_string(),
            name: header.name,
            mobile: header.mobile,
            panchayath: header.location,
            ward: header.ward,
            user_type: header.role.as_str().to_string(),
            created_at: DateTime::now(),
        }
    }
}

impl TryFrom<SurveyDoc> for ResponseHeader {
    type Error = SurveyError;

    fn try_from(doc: SurveyDoc) -> Result<Self, Self::Error> {
        let role: Role = doc
            .user_type
            .parse()
            .map_err(|e| SurveyError::InvalidRecord(format!("survey {}: {}", doc.id, e)))?;

        Ok(ResponseHeader {
            id: doc.id,
            name: doc.name,
            mobile: doc.mobile,
            location: doc.panchayath,
            ward: doc.ward,
            role,
            created_at: doc.created_at.to_chrono(),
        })
    }
}

impl IntoIndexes for SurveyDoc {
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
            (
                doc! { "created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_desc".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SurveyDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Survey item document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SurveyItemDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub id: String,

    /// Owning header's `id`
    pub survey_id: String,

    pub item_name: String,

    /// `product` or `service`
    pub item_type: String,
}

impl SurveyItemDoc {
    pub fn new(item: NewLineItem) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: Uuid::new_v4().to_string(),
            survey_id: item.header_id,
            item_name: item.label,
            item_type: item.category.as_str().to_string(),
        }
    }
}

impl TryFrom<SurveyItemDoc> for ResponseLineItem {
    type Error = SurveyError;

    fn try_from(doc: SurveyItemDoc) -> Result<Self, Self::Error> {
        let category: Category = doc
            .item_type
            .parse()
            .map_err(|e| SurveyError::InvalidRecord(format!("survey item {}: {}", doc.id, e)))?;

        Ok(ResponseLineItem {
            id: doc.id,
            header_id: doc.survey_id,
            label: doc.item_name,
            category,
        })
    }
}

impl IntoIndexes for SurveyItemDoc {
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
            (
                doc! { "survey_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("survey_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SurveyItemDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// `item_name, item_type` projection of a survey item
#[derive(Deserialize, Clone, Debug)]
pub struct ItemLabelRow {
    pub item_name: String,
    pub item_type: String,
}

impl ItemLabelRow {
    pub fn projection() -> Document {
        doc! { "_id": 0, "item_name": 1, "item_type": 1 }
    }
}

impl TryFrom<ItemLabelRow> for ItemLabel {
    type Error = SurveyError;

    fn try_from(row: ItemLabelRow) -> Result<Self, Self::Error> {
        let category: Category = row
            .item_type
            .parse()
            .map_err(|e: String| SurveyError::InvalidRecord(e))?;

        Ok(ItemLabel {
            label: row.item_name,
            category,
        })
    }
}
