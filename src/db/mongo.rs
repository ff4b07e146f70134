//! MongoDB client and collection wrapper

use bson::{doc, DateTime, Document};
use futures_util::StreamExt;
use mongodb::{
    options::{FindOptions, IndexOptions, UpdateModifications},
    results::{DeleteResult, UpdateResult},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::SurveyError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping the database
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, SurveyError> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast on an unreachable server instead of hanging on selection
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| SurveyError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SurveyError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection with its indexes applied
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, SurveyError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, SurveyError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), SurveyError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| SurveyError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<T, SurveyError> {
        stamp(item.mut_metadata());

        self.inner
            .insert_one(&item)
            .await
            .map_err(|e| SurveyError::Database(format!("Insert failed: {}", e)))?;

        Ok(item)
    }

    /// Insert several documents in one write
    pub async fn insert_many(&self, mut items: Vec<T>) -> Result<Vec<T>, SurveyError> {
        if items.is_empty() {
            return Ok(items);
        }

        for item in items.iter_mut() {
            stamp(item.mut_metadata());
        }

        self.inner
            .insert_many(&items)
            .await
            .map_err(|e| SurveyError::Database(format!("Insert failed: {}", e)))?;

        Ok(items)
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, SurveyError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| SurveyError::Database(format!("Find failed: {}", e)))
    }

    /// Find documents matching `filter`, optionally sorted
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, SurveyError> {
        let options = FindOptions::builder().sort(sort).build();
        collect_cursor(&self.inner, filter, options).await
    }

    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, SurveyError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| SurveyError::Database(format!("Update failed: {}", e)))
    }

    /// Remove a document outright; nothing referencing it is touched
    pub async fn delete_one(&self, filter: Document) -> Result<DeleteResult, SurveyError> {
        self.inner
            .delete_one(filter)
            .await
            .map_err(|e| SurveyError::Database(format!("Delete failed: {}", e)))
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

fn stamp(metadata: &mut Metadata) {
    let now = DateTime::now();
    metadata.created_at = Some(now);
    metadata.updated_at = Some(now);
}

/// Run a find and collect every readable document
///
/// Undecodable documents are logged and skipped.
pub async fn collect_cursor<R>(
    collection: &Collection<R>,
    filter: Document,
    options: FindOptions,
) -> Result<Vec<R>, SurveyError>
where
    R: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection
        .find(filter)
        .with_options(options)
        .await
        .map_err(|e| SurveyError::Database(format!("Find failed: {}", e)))?;

    let results: Vec<R> = cursor
        .filter_map(|doc| async {
            match doc {
                Ok(d) => Some(d),
                Err(e) => {
                    error!("Error reading document: {}", e);
                    None
                }
            }
        })
        .collect()
        .await;

    Ok(results)
}
