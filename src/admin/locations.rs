//! Panchayath management tab

use std::sync::Arc;
use tracing::{error, info};

use super::ActionOutcome;
use crate::i18n::{Lang, Message};
use crate::model::{Location, LocationInput};
use crate::notify::Notification;
use crate::store::LocationStore;
use crate::types::SurveyError;

/// Keeps the last successfully read location list. Every successful
/// mutation is followed by a full re-read.
pub struct ReferenceDataManager {
    store: Arc<dyn LocationStore>,
    lang: Lang,
    locations: Vec<Location>,
}

impl ReferenceDataManager {
    pub fn new(store: Arc<dyn LocationStore>, lang: Lang) -> Self {
        Self {
            store,
            lang,
            locations: Vec::new(),
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Re-read the list; on failure the current list stays
    pub async fn load(&mut self) -> Option<Notification> {
        match self.store.list_locations().await {
            Ok(locations) => {
                self.locations = locations;
                None
            }
            Err(e) => {
                error!("Error fetching panchayaths: {}", e);
                Some(Notification::error(Message::LocationsLoadFailed, self.lang))
            }
        }
    }

    pub async fn create(&mut self, input: LocationInput) -> ActionOutcome {
        let input = match self.check(input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };

        match self.store.insert_location(input).await {
            Ok(location) => {
                info!("Added panchayath {} ({})", location.name, location.id);
                let refresh = self.load().await;
                ActionOutcome::done(Message::LocationAdded, self.lang, refresh)
            }
            Err(e) => self.write_failed(e),
        }
    }

    pub async fn update(&mut self, id: &str, input: LocationInput) -> ActionOutcome {
        let input = match self.check(input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };

        match self.store.update_location(id, input).await {
            Ok(()) => {
                info!("Updated panchayath {}", id);
                let refresh = self.load().await;
                ActionOutcome::done(Message::LocationUpdated, self.lang, refresh)
            }
            Err(e) => self.write_failed(e),
        }
    }

    pub async fn delete(&mut self, id: &str, confirmed: bool) -> ActionOutcome {
        if !confirmed {
            return ActionOutcome::confirm(Message::LocationDeleteConfirm, self.lang);
        }

        match self.store.delete_location(id).await {
            Ok(()) => {
                info!("Deleted panchayath {}", id);
                let refresh = self.load().await;
                ActionOutcome::done(Message::LocationDeleted, self.lang, refresh)
            }
            Err(e) => {
                error!("Error deleting panchayath {}: {}", id, e);
                ActionOutcome::failed(Message::LocationDeleteFailed, self.lang)
            }
        }
    }

    fn check(&self, input: LocationInput) -> Result<LocationInput, ActionOutcome> {
        let input = input.normalized();
        if input.name.is_empty() {
            return Err(ActionOutcome::failed(Message::LocationNameRequired, self.lang));
        }
        if input.ward_count < 1 {
            return Err(ActionOutcome::failed(Message::WardCountInvalid, self.lang));
        }
        Ok(input)
    }

    fn write_failed(&self, e: SurveyError) -> ActionOutcome {
        error!("Error saving panchayath: {}", e);
        let detail = e.detail().trim();
        if detail.is_empty() {
            ActionOutcome::failed(Message::OperationFailed, self.lang)
        } else {
            ActionOutcome::Failed {
                notification: Notification::error_text(detail),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOp};

    fn input(name: &str, ward_count: u32) -> LocationInput {
        LocationInput {
            name: name.into(),
            name_ml: None,
            ward_count,
        }
    }

    fn manager() -> (ReferenceDataManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ReferenceDataManager::new(store.clone(), Lang::En), store)
    }

    fn names(manager: &ReferenceDataManager) -> Vec<&str> {
        manager.locations().iter().map(|l| l.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_refreshes_sorted_list() {
        let (mut manager, _) = manager();
        assert!(manager.create(input("Kalady", 17)).await.is_done());
        let outcome = manager.create(input("  Aluva ", 22)).await;

        assert_eq!(
            outcome.notification().unwrap().message,
            "Panchayath added successfully"
        );
        assert_eq!(names(&manager), vec!["Aluva", "Kalady"]);
    }

    #[tokio::test]
    async fn test_blank_name_and_zero_wards_rejected_locally() {
        let (mut manager, store) = manager();

        let outcome = manager.create(input("   ", 3)).await;
        assert_eq!(outcome.notification().unwrap().message, "Name is required");

        let outcome = manager.create(input("Aluva", 0)).await;
        assert_eq!(
            outcome.notification().unwrap().message,
            "Ward count must be at least 1"
        );
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_unknown_id() {
        let (mut manager, _) = manager();
        manager.create(input("Aluva", 22)).await;
        let id = manager.locations()[0].id.clone();

        let mut changed = input("Aluva", 23);
        changed.name_ml = Some("ആലുവ".into());
        assert!(manager.update(&id, changed).await.is_done());
        assert_eq!(manager.locations()[0].ward_count, 23);
        assert_eq!(manager.locations()[0].display_name(), "ആലുവ");

        let outcome = manager.update("missing", input("X1", 1)).await;
        assert!(!outcome.is_done());
        assert!(outcome.notification().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_store_message_surfaces_on_failed_create() {
        let (mut manager, store) = manager();
        store.fail(StoreOp::InsertLocation).await;

        let outcome = manager.create(input("Aluva", 22)).await;
        assert_eq!(
            outcome.notification().unwrap().message,
            "InsertLocation failed"
        );
        assert!(manager.locations().is_empty());
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let (mut manager, store) = manager();
        manager.create(input("Aluva", 22)).await;
        let id = manager.locations()[0].id.clone();
        let before = store.call_count();

        let outcome = manager.delete(&id, false).await;
        assert_eq!(
            outcome,
            ActionOutcome::ConfirmationRequired {
                prompt: "Are you sure you want to delete this panchayath?".into()
            }
        );
        assert_eq!(store.call_count(), before);

        assert!(manager.delete(&id, true).await.is_done());
        assert!(manager.locations().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let (mut manager, store) = manager();
        manager.create(input("Aluva", 22)).await;
        store.fail(StoreOp::DeleteLocation).await;
        let id = manager.locations()[0].id.clone();

        let outcome = manager.delete(&id, true).await;
        assert_eq!(
            outcome.notification().unwrap().message,
            "Failed to delete panchayath"
        );
        assert_eq!(names(&manager), vec!["Aluva"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_list() {
        let (mut manager, store) = manager();
        manager.create(input("Aluva", 22)).await;
        store.fail(StoreOp::ListLocations).await;

        let notification = manager.load().await.unwrap();
        assert_eq!(notification.message, "Failed to fetch panchayaths");
        assert_eq!(names(&manager), vec!["Aluva"]);
    }

    #[tokio::test]
    async fn test_failed_reread_after_create_is_reported() {
        let (mut manager, store) = manager();
        store.fail(StoreOp::ListLocations).await;

        let outcome = manager.create(input("Aluva", 3)).await;
        assert!(outcome.is_done());
        assert_eq!(
            outcome.notification().unwrap().message,
            "Panchayath added successfully"
        );
        assert_eq!(
            outcome.refresh().unwrap().message,
            "Failed to fetch panchayaths"
        );
        assert!(manager.locations().is_empty());

        store.recover(StoreOp::ListLocations).await;
        let outcome = manager.create(input("Kalady", 17)).await;
        assert!(outcome.refresh().is_none());
        assert_eq!(names(&manager), vec!["Aluva", "Kalady"]);
    }
}
