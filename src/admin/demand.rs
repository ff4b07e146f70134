//! Most demanded products and services

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::i18n::{Lang, Message};
use crate::model::{Category, ItemLabel};
use crate::notify::Notification;
use crate::store::ResponseStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandEntry {
    /// 1-based position within its category
    pub rank: usize,
    pub label: String,
    pub category: Category,
    pub count: usize,
}

/// Group labels by exact (label, category) and rank each category by count.
///
/// Ties keep the order in which the labels were first seen.
pub fn aggregate(labels: &[ItemLabel]) -> (Vec<DemandEntry>, Vec<DemandEntry>) {
    let mut index: HashMap<(&str, Category), usize> = HashMap::new();
    let mut groups: Vec<DemandEntry> = Vec::new();

    for item in labels {
        let key = (item.label.as_str(), item.category);
        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key, groups.len());
                groups.push(DemandEntry {
                    rank: 0,
                    label: item.label.clone(),
                    category: item.category,
                    count: 1,
                });
            }
        }
    }

    let (products, services): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .partition(|e| e.category == Category::Product);
    (ranked(products), ranked(services))
}

fn ranked(mut entries: Vec<DemandEntry>) -> Vec<DemandEntry> {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

pub struct DemandAggregator {
    store: Arc<dyn ResponseStore>,
    lang: Lang,
    products: Vec<DemandEntry>,
    services: Vec<DemandEntry>,
}

impl DemandAggregator {
    pub fn new(store: Arc<dyn ResponseStore>, lang: Lang) -> Self {
        Self {
            store,
            lang,
            products: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn products(&self) -> &[DemandEntry] {
        &self.products
    }

    pub fn services(&self) -> &[DemandEntry] {
        &self.services
    }

    /// Recompute both lists; a failed read leaves them as they were
    pub async fn load(&mut self) -> Option<Notification> {
        match self.store.list_item_labels().await {
            Ok(labels) => {
                let (products, services) = aggregate(&labels);
                debug!(
                    "Aggregated {} items into {} products and {} services",
                    labels.len(),
                    products.len(),
                    services.len()
                );
                self.products = products;
                self.services = services;
                None
            }
            Err(e) => {
                error!("Error fetching demand data: {}", e);
                Some(Notification::error(Message::DemandLoadFailed, self.lang))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(label: &str, category: Category) -> ItemLabel {
        ItemLabel {
            label: label.into(),
            category,
        }
    }

    fn summary(entries: &[DemandEntry]) -> Vec<(usize, &str, usize)> {
        entries
            .iter()
            .map(|e| (e.rank, e.label.as_str(), e.count))
            .collect()
    }

    #[test]
    fn test_groups_case_sensitively() {
        let (products, services) = aggregate(&[
            label("Soap", Category::Product),
            label("soap", Category::Product),
            label("Soap", Category::Product),
            label("Soap", Category::Service),
        ]);

        assert_eq!(summary(&products), vec![(1, "Soap", 2), (2, "soap", 1)]);
        assert_eq!(summary(&services), vec![(1, "Soap", 1)]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let (products, _) = aggregate(&[
            label("Rice", Category::Product),
            label("Oil", Category::Product),
            label("Salt", Category::Product),
            label("Salt", Category::Product),
            label("Oil", Category::Product),
        ]);

        assert_eq!(
            summary(&products),
            vec![(1, "Oil", 2), (2, "Salt", 2), (3, "Rice", 1)]
        );
    }

    #[test]
    fn test_empty_input() {
        let (products, services) = aggregate(&[]);
        assert!(products.is_empty());
        assert!(services.is_empty());
    }
}
