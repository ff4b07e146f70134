//! Survey responses tab
//!
//! Reads every header, then each header's items with one read per header.
//! The distinct-item statistic comes from a separate read of all items and
//! runs alongside the per-header reads.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ActionOutcome;
use crate::i18n::{Lang, Message};
use crate::model::{ItemLabel, ResponseHeader, ResponseLineItem};
use crate::notify::Notification;
use crate::store::ResponseStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BrowserStats {
    pub total_surveys: usize,
    /// Distinct labels across all items, ignoring case
    pub unique_items: usize,
}

/// One header with its items, as rendered in the list
#[derive(Debug, Serialize)]
pub struct SurveyEntry<'a> {
    #[serde(flatten)]
    pub header: &'a ResponseHeader,
    pub items: &'a [ResponseLineItem],
}

pub struct ResponseBrowser {
    store: Arc<dyn ResponseStore>,
    lang: Lang,
    headers: Vec<ResponseHeader>,
    items: HashMap<String, Vec<ResponseLineItem>>,
    stats: BrowserStats,
}

/// Case-insensitive count of distinct labels
pub fn count_unique_labels(labels: &[ItemLabel]) -> usize {
    labels
        .iter()
        .map(|l| l.label.to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

impl ResponseBrowser {
    pub fn new(store: Arc<dyn ResponseStore>, lang: Lang) -> Self {
        Self {
            store,
            lang,
            headers: Vec::new(),
            items: HashMap::new(),
            stats: BrowserStats::default(),
        }
    }

    /// Headers newest first
    pub fn headers(&self) -> &[ResponseHeader] {
        &self.headers
    }

    /// Items of a header; empty when it has none
    pub fn items_for(&self, header_id: &str) -> &[ResponseLineItem] {
        self.items.get(header_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stats(&self) -> BrowserStats {
        self.stats
    }

    pub fn entries(&self) -> Vec<SurveyEntry<'_>> {
        self.headers
            .iter()
            .map(|header| SurveyEntry {
                header,
                items: self.items_for(&header.id),
            })
            .collect()
    }

    /// Rebuild the whole view. A failed header read keeps the previous view;
    /// failed item reads degrade to empty lists.
    pub async fn load(&mut self) -> Option<Notification> {
        let headers = match self.store.list_headers().await {
            Ok(headers) => headers,
            Err(e) => {
                error!("Error fetching surveys: {}", e);
                return Some(Notification::error(Message::SurveysLoadFailed, self.lang));
            }
        };

        let store = self.store.as_ref();
        let fan_out = async {
            let mut by_header = HashMap::with_capacity(headers.len());
            for header in &headers {
                let items = match store.items_for_header(&header.id).await {
                    Ok(items) => items,
                    Err(e) => {
                        warn!("Error fetching items for survey {}: {}", header.id, e);
                        Vec::new()
                    }
                };
                by_header.insert(header.id.clone(), items);
            }
            by_header
        };
        let unique = async {
            match store.list_item_labels().await {
                Ok(labels) => count_unique_labels(&labels),
                Err(e) => {
                    warn!("Error fetching item statistics: {}", e);
                    0
                }
            }
        };
        let (items, unique_items) = tokio::join!(fan_out, unique);

        self.stats = BrowserStats {
            total_surveys: headers.len(),
            unique_items,
        };
        self.headers = headers;
        self.items = items;
        None
    }

    /// Delete a header and reload. Its items stay in the store.
    pub async fn delete(&mut self, id: &str, confirmed: bool) -> ActionOutcome {
        if !confirmed {
            return ActionOutcome::confirm(Message::SurveyDeleteConfirm, self.lang);
        }

        match self.store.delete_header(id).await {
            Ok(()) => {
                info!("Deleted survey {}", id);
                let refresh = self.load().await;
                ActionOutcome::done(Message::SurveyDeleted, self.lang, refresh)
            }
            Err(e) => {
                error!("Error deleting survey {}: {}", id, e);
                ActionOutcome::failed(Message::SurveyDeleteFailed, self.lang)
            }
        }
    }
}
