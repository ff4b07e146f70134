//! MongoDB-backed store

use async_trait::async_trait;
use bson::doc;
use mongodb::options::FindOptions;
use tracing::warn;

use super::{AppRole, LocationStore, ResponseStore, RoleStore};
use crate::db::mongo::collect_cursor;
use crate::db::schemas::{
    ItemLabelRow, PanchayathDoc, SurveyDoc, SurveyItemDoc, UserRoleDoc, PANCHAYATH_COLLECTION,
    SURVEY_COLLECTION, SURVEY_ITEM_COLLECTION, USER_ROLE_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::model::{
    ItemLabel, Location, LocationInput, NewLineItem, NewResponseHeader, ResponseHeader,
    ResponseLineItem,
};
use crate::types::{Result, SurveyError};

/// All survey collections of one database
pub struct MongoSurveyStore {
    panchayaths: MongoCollection<PanchayathDoc>,
    surveys: MongoCollection<SurveyDoc>,
    survey_items: MongoCollection<SurveyItemDoc>,
    user_roles: MongoCollection<UserRoleDoc>,
}

impl MongoSurveyStore {
    /// Open the collections and apply their indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            panchayaths: mongo.collection(PANCHAYATH_COLLECTION).await?,
            surveys: mongo.collection(SURVEY_COLLECTION).await?,
            survey_items: mongo.collection(SURVEY_ITEM_COLLECTION).await?,
            user_roles: mongo.collection(USER_ROLE_COLLECTION).await?,
        })
    }
}

/// Convert documents to DTOs, dropping rows that fail validation
fn convert_rows<D, T>(rows: Vec<D>, what: &str) -> Vec<T>
where
    T: TryFrom<D, Error = SurveyError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Skipping malformed {} row: {}", what, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl LocationStore for MongoSurveyStore {
    async fn list_locations(&self) -> Result<Vec<Location>> {
        let docs = self
            .panchayaths
            .find_many(doc! {}, Some(doc! { "name": 1 }))
            .await?;
        Ok(convert_rows(docs, "panchayath"))
    }

    async fn insert_location(&self, input: LocationInput) -> Result<Location> {
        let doc = self.panchayaths.insert_one(PanchayathDoc::new(input)).await?;
        Location::try_from(doc)
    }

    async fn update_location(&self, id: &str, input: LocationInput) -> Result<()> {
        let result = self
            .panchayaths
            .update_one(
                doc! { "id": id },
                doc! {
                    "$set": {
                        "name": input.name,
                        "name_ml": input.name_ml,
                        "ward_count": i64::from(input.ward_count),
                        "metadata.updated_at": bson::DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(SurveyError::NotFound(format!("panchayath {id}")));
        }
        Ok(())
    }

    async fn delete_location(&self, id: &str) -> Result<()> {
        self.panchayaths.delete_one(doc! { "id": id }).await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MongoSurveyStore {
    async fn insert_header(&self, header: NewResponseHeader) -> Result<ResponseHeader> {
        let doc = self.surveys.insert_one(SurveyDoc::new(header)).await?;
        ResponseHeader::try_from(doc)
    }

    async fn insert_items(&self, items: Vec<NewLineItem>) -> Result<Vec<ResponseLineItem>> {
        let docs = items.into_iter().map(SurveyItemDoc::new).collect();
        let stored = self.survey_items.insert_many(docs).await?;
        stored.into_iter().map(ResponseLineItem::try_from).collect()
    }

    async fn list_headers(&self) -> Result<Vec<ResponseHeader>> {
        let docs = self
            .surveys
            .find_many(doc! {}, Some(doc! { "created_at": -1 }))
            .await?;
        Ok(convert_rows(docs, "survey"))
    }

    async fn items_for_header(&self, header_id: &str) -> Result<Vec<ResponseLineItem>> {
        let docs = self
            .survey_items
            .find_many(doc! { "survey_id": header_id }, None)
            .await?;
        Ok(convert_rows(docs, "survey item"))
    }

    async fn list_item_labels(&self) -> Result<Vec<ItemLabel>> {
        let labels = self.survey_items.inner().clone_with_type::<ItemLabelRow>();
        let options = FindOptions::builder()
            .projection(ItemLabelRow::projection())
            .build();
        let rows = collect_cursor(&labels, doc! {}, options).await?;
        Ok(convert_rows(rows, "survey item"))
    }

    async fn delete_header(&self, id: &str) -> Result<()> {
        self.surveys.delete_one(doc! { "id": id }).await?;
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MongoSurveyStore {
    async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool> {
        let grant = self
            .user_roles
            .find_one(doc! { "user_id": user_id, "role": role.as_str() })
            .await?;
        Ok(grant.is_some())
    }
}
