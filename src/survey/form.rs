//! Public submission form
//!
//! Holds the respondent's draft, the location selector options and the
//! post-submit confirmation window. The write path itself is
//! [`submit_survey`], which the HTTP route calls directly.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::validation::{validate, FieldError, SurveyInput};
use crate::i18n::{Lang, Message};
use crate::model::{Location, NewLineItem, ResponseHeader, ResponseLineItem};
use crate::notify::Notification;
use crate::store::{LocationStore, ResponseStore};

/// How long the confirmation stays up after a successful submit
pub const CONFIRMATION_WINDOW: Duration = Duration::from_secs(5);

/// One entry of the location selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOption {
    /// Canonical name, submitted with the form
    pub value: String,
    /// Malayalam name when present
    pub label: String,
    pub ward_count: u32,
}

impl From<&Location> for LocationOption {
    fn from(location: &Location) -> Self {
        Self {
            value: location.name.clone(),
            label: location.display_name().to_string(),
            ward_count: location.ward_count,
        }
    }
}

/// Read the selector options; a failed read gives no options and a notification
pub async fn load_location_options(
    locations: &dyn LocationStore,
    lang: Lang,
) -> (Vec<LocationOption>, Option<Notification>) {
    match locations.list_locations().await {
        Ok(list) => (list.iter().map(LocationOption::from).collect(), None),
        Err(e) => {
            error!("Error fetching panchayaths: {}", e);
            (
                Vec::new(),
                Some(Notification::error(Message::LocationsLoadFailed, lang)),
            )
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted {
        header: ResponseHeader,
        items: Vec<ResponseLineItem>,
        notification: Notification,
    },
    /// Rejected before any store call
    Invalid(Vec<FieldError>),
    /// A store write failed; an already written header stays in place
    Failed(Notification),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }
}

/// Validate, then write the header followed by its items
pub async fn submit_survey(
    responses: &dyn ResponseStore,
    input: &SurveyInput,
    lang: Lang,
) -> SubmitOutcome {
    let valid = match validate(input, lang) {
        Ok(valid) => valid,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    let header = match responses.insert_header(valid.header).await {
        Ok(header) => header,
        Err(e) => {
            error!("Error submitting survey: {}", e);
            return SubmitOutcome::Failed(Notification::error(Message::SurveySubmitFailed, lang));
        }
    };

    let new_items = NewLineItem::for_header(&header, &valid.labels);
    let items = match responses.insert_items(new_items).await {
        Ok(items) => items,
        Err(e) => {
            error!(
                "Error submitting survey items, header {} left without items: {}",
                header.id, e
            );
            return SubmitOutcome::Failed(Notification::error(Message::SurveySubmitFailed, lang));
        }
    };

    info!(
        "Survey {} submitted with {} {} item(s)",
        header.id,
        items.len(),
        header.role
    );
    SubmitOutcome::Submitted {
        header,
        items,
        notification: Notification::success(Message::SurveySubmitted, lang),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Confirmed { remaining: Duration },
}

pub struct SubmissionForm {
    locations: Arc<dyn LocationStore>,
    responses: Arc<dyn ResponseStore>,
    lang: Lang,
    options: Vec<LocationOption>,
    draft: SurveyInput,
    confirmed_until: Option<Instant>,
}

impl SubmissionForm {
    pub fn new(
        locations: Arc<dyn LocationStore>,
        responses: Arc<dyn ResponseStore>,
        lang: Lang,
    ) -> Self {
        Self {
            locations,
            responses,
            lang,
            options: Vec::new(),
            draft: SurveyInput::blank(),
            confirmed_until: None,
        }
    }

    /// Populate the location selector
    pub async fn mount(&mut self) -> Option<Notification> {
        let (options, notification) = load_location_options(self.locations.as_ref(), self.lang).await;
        self.options = options;
        notification
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn options(&self) -> &[LocationOption] {
        &self.options
    }

    pub fn draft(&self) -> &SurveyInput {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SurveyInput {
        &mut self.draft
    }

    pub fn add_item_slot(&mut self) {
        self.draft.items.push(String::new());
    }

    /// Returns false when `index` is out of range
    pub fn update_item(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.draft.items.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove a slot; the last remaining slot stays
    pub fn remove_item_slot(&mut self, index: usize) -> bool {
        if self.draft.items.len() <= 1 || index >= self.draft.items.len() {
            return false;
        }
        self.draft.items.remove(index);
        true
    }

    /// Submit the draft. On success the draft is cleared and the
    /// confirmation window starts; otherwise the draft is kept.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = submit_survey(self.responses.as_ref(), &self.draft, self.lang).await;
        if outcome.is_submitted() {
            self.draft = SurveyInput::blank();
            self.confirmed_until = Some(Instant::now() + CONFIRMATION_WINDOW);
        } else if let SubmitOutcome::Invalid(errors) = &outcome {
            warn!("Survey rejected with {} field error(s)", errors.len());
        }
        outcome
    }

    pub fn status(&self) -> FormStatus {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> FormStatus {
        match self.confirmed_until {
            Some(until) if now < until => FormStatus::Confirmed {
                remaining: until - now,
            },
            _ => FormStatus::Editing,
        }
    }

    /// "Submit another response"
    pub fn dismiss_confirmation(&mut self) {
        self.confirmed_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, LocationInput};
    use crate::store::{MemoryStore, StoreOp};

    async fn form_with_store() -> (SubmissionForm, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_location(LocationInput {
                name: "Aluva".into(),
                name_ml: Some("ആലുവ".into()),
                ward_count: 22,
            })
            .await
            .unwrap();
        let form = SubmissionForm::new(store.clone(), store.clone(), Lang::Ml);
        (form, store)
    }

    fn fill(form: &mut SubmissionForm) {
        let draft = form.draft_mut();
        draft.name = "Anu".into();
        draft.mobile = "9876543210".into();
        draft.location = "Aluva".into();
        draft.ward = "3".into();
        draft.role = Some("agent".into());
        draft.items = vec!["Plumbing".into(), "  ".into()];
    }

    #[tokio::test]
    async fn test_mount_lists_localized_options() {
        let (mut form, _) = form_with_store().await;
        assert!(form.mount().await.is_none());

        assert_eq!(form.options().len(), 1);
        assert_eq!(form.options()[0].label, "ആലുവ");
        assert_eq!(form.options()[0].value, "Aluva");
    }

    #[tokio::test]
    async fn test_mount_failure_leaves_selector_empty() {
        let (mut form, store) = form_with_store().await;
        store.fail(StoreOp::ListLocations).await;

        let notification = form.mount().await.unwrap();
        assert!(notification.is_error());
        assert_eq!(notification.message, Message::LocationsLoadFailed.text(Lang::Ml));
        assert!(form.options().is_empty());
    }

    #[tokio::test]
    async fn test_item_slots() {
        let (mut form, _) = form_with_store().await;
        assert_eq!(form.draft().items.len(), 1);
        assert!(!form.remove_item_slot(0));

        form.add_item_slot();
        assert!(form.update_item(1, "Rice"));
        assert!(!form.update_item(5, "x"));
        assert!(form.remove_item_slot(0));
        assert_eq!(form.draft().items, vec!["Rice"]);
    }

    #[tokio::test]
    async fn test_agent_items_are_services() {
        let (mut form, store) = form_with_store().await;
        fill(&mut form);

        match form.submit().await {
            SubmitOutcome::Submitted { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].category, Category::Service);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(store.all_items().await.len(), 1);
        assert_eq!(form.draft(), &SurveyInput::blank());
    }

    #[tokio::test]
    async fn test_invalid_draft_makes_no_store_call() {
        let (mut form, store) = form_with_store().await;
        fill(&mut form);
        form.draft_mut().mobile = "12345".into();
        let before = store.call_count();

        assert!(matches!(form.submit().await, SubmitOutcome::Invalid(_)));
        assert_eq!(store.call_count(), before);
        assert_eq!(form.draft().mobile, "12345");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_draft() {
        let (mut form, store) = form_with_store().await;
        fill(&mut form);
        store.fail(StoreOp::InsertHeader).await;

        match form.submit().await {
            SubmitOutcome::Failed(n) => {
                assert_eq!(n.message, Message::SurveySubmitFailed.text(Lang::Ml))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(form.draft().name, "Anu");
        assert_eq!(form.status(), FormStatus::Editing);
    }

    #[tokio::test]
    async fn test_confirmation_window() {
        tokio::time::pause();
        let (mut form, _) = form_with_store().await;
        fill(&mut form);

        assert!(form.submit().await.is_submitted());
        assert_eq!(
            form.status(),
            FormStatus::Confirmed {
                remaining: CONFIRMATION_WINDOW
            }
        );

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(matches!(form.status(), FormStatus::Confirmed { .. }));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(form.status(), FormStatus::Editing);
    }

    #[tokio::test]
    async fn test_dismiss_confirmation_early() {
        let (mut form, _) = form_with_store().await;
        fill(&mut form);
        assert!(form.submit().await.is_submitted());

        form.dismiss_confirmation();
        assert_eq!(form.status(), FormStatus::Editing);
    }
}
