//! In-memory store
//!
//! Implements every store trait over process-local tables. Used when the
//! service runs in dev mode without MongoDB, and by the tests, which can make
//! individual operations fail to reproduce partial-write states.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AppRole, LocationStore, ResponseStore, RoleStore};
use crate::model::{
    ItemLabel, Location, LocationInput, NewLineItem, NewResponseHeader, ResponseHeader,
    ResponseLineItem,
};
use crate::types::{Result, SurveyError};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListLocations,
    InsertLocation,
    UpdateLocation,
    DeleteLocation,
    InsertHeader,
    InsertItems,
    ListHeaders,
    ItemsForHeader,
    ListItemLabels,
    DeleteHeader,
    HasRole,
}

#[derive(Default)]
struct Tables {
    locations: Vec<Location>,
    /// Insertion sequence kept alongside each header to order equal timestamps
    headers: Vec<(u64, ResponseHeader)>,
    items: Vec<ResponseLineItem>,
    roles: HashSet<(String, AppRole)>,
    next_seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: RwLock<HashSet<StoreOp>>,
    calls: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call of `op` fail until [`MemoryStore::recover`]
    pub async fn fail(&self, op: StoreOp) {
        self.failing.write().await.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.failing.write().await.remove(&op);
    }

    /// Number of store calls made so far, failed ones included
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn grant_role(&self, user_id: &str, role: AppRole) {
        self.tables
            .write()
            .await
            .roles
            .insert((user_id.to_string(), role));
    }

    /// Every stored item, including those whose header is gone
    pub async fn all_items(&self) -> Vec<ResponseLineItem> {
        self.tables.read().await.items.clone()
    }

    async fn enter(&self, op: StoreOp) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().await.contains(&op) {
            return Err(SurveyError::Database(format!("{op:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.enter(StoreOp::ListLocations).await?;

        let mut locations = self.tables.read().await.locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn insert_location(&self, input: LocationInput) -> Result<Location> {
        self.enter(StoreOp::InsertLocation).await?;

        let location = Location {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            name_ml: input.name_ml,
            ward_count: input.ward_count,
        };
        self.tables.write().await.locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(&self, id: &str, input: LocationInput) -> Result<()> {
        self.enter(StoreOp::UpdateLocation).await?;

        let mut tables = self.tables.write().await;
        let location = tables
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SurveyError::NotFound(format!("panchayath {id}")))?;

        location.name = input.name;
        location.name_ml = input.name_ml;
        location.ward_count = input.ward_count;
        Ok(())
    }

    async fn delete_location(&self, id: &str) -> Result<()> {
        self.enter(StoreOp::DeleteLocation).await?;

        self.tables.write().await.locations.retain(|l| l.id != id);
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn insert_header(&self, header: NewResponseHeader) -> Result<ResponseHeader> {
        self.enter(StoreOp::InsertHeader).await?;

        let stored = ResponseHeader {
            id: Uuid::new_v4().to_string(),
            name: header.name,
            mobile: header.mobile,
            location: header.location,
            ward: header.ward,
            role: header.role,
            created_at: Utc::now(),
        };

        let mut tables = self.tables.write().await;
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.headers.push((seq, stored.clone()));
        Ok(stored)
    }

    async fn insert_items(&self, items: Vec<NewLineItem>) -> Result<Vec<ResponseLineItem>> {
        self.enter(StoreOp::InsertItems).await?;

        let stored: Vec<ResponseLineItem> = items
            .into_iter()
            .map(|item| ResponseLineItem {
                id: Uuid::new_v4().to_string(),
                header_id: item.header_id,
                label: item.label,
                category: item.category,
            })
            .collect();

        self.tables.write().await.items.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn list_headers(&self) -> Result<Vec<ResponseHeader>> {
        self.enter(StoreOp::ListHeaders).await?;

        let mut headers = self.tables.read().await.headers.clone();
        headers.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(headers.into_iter().map(|(_, h)| h).collect())
    }

    async fn items_for_header(&self, header_id: &str) -> Result<Vec<ResponseLineItem>> {
        self.enter(StoreOp::ItemsForHeader).await?;

        Ok(self
            .tables
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.header_id == header_id)
            .cloned()
            .collect())
    }

    async fn list_item_labels(&self) -> Result<Vec<ItemLabel>> {
        self.enter(StoreOp::ListItemLabels).await?;

        Ok(self
            .tables
            .read()
            .await
            .items
            .iter()
            .map(ItemLabel::from)
            .collect())
    }

    async fn delete_header(&self, id: &str) -> Result<()> {
        self.enter(StoreOp::DeleteHeader).await?;

        self.tables.write().await.headers.retain(|(_, h)| h.id != id);
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn has_role(&self, user_id: &str, role: AppRole) -> Result<bool> {
        self.enter(StoreOp::HasRole).await?;

        Ok(self
            .tables
            .read()
            .await
            .roles
            .contains(&(user_id.to_string(), role)))
    }
}
