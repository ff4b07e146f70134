//! Field rules for the public survey form
//!
//! Inputs are trimmed first; the trimmed values are what gets stored.
//! Validation never touches the store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::i18n::{Lang, Message};
use crate::model::{NewResponseHeader, Role};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const LOCATION_MIN: usize = 2;
pub const LOCATION_MAX: usize = 100;
pub const WARD_MIN: usize = 1;
pub const WARD_MAX: usize = 50;
pub const ITEM_MIN: usize = 2;
pub const ITEM_MAX: usize = 200;

// ASCII digits only; `\d` would also admit Malayalam numerals
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("mobile pattern compiles"));

/// Raw form contents as typed by the respondent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    /// Panchayath name picked from the selector
    #[serde(default, alias = "panchayath")]
    pub location: String,
    #[serde(default)]
    pub ward: String,
    /// `respondent`, `agent` or the legacy `customer`; absent until chosen
    #[serde(default, alias = "user_type", alias = "userType")]
    pub role: Option<String>,
    /// Item slots in display order, blanks included
    #[serde(default, alias = "products")]
    pub items: Vec<String>,
}

impl Default for SurveyInput {
    fn default() -> Self {
        Self::blank()
    }
}

impl SurveyInput {
    /// Empty form with a single empty item slot
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            mobile: String::new(),
            location: String::new(),
            ward: String::new(),
            role: None,
            items: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Mobile,
    Location,
    Ward,
    Role,
    Items,
}

/// One inline error under a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    /// Slot position for item errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: Message, lang: Lang) -> Self {
        Self {
            field,
            index: None,
            message: message.text(lang).to_string(),
        }
    }

    fn at(field: Field, index: usize, message: Message, lang: Lang) -> Self {
        Self {
            index: Some(index),
            ..Self::new(field, message, lang)
        }
    }
}

/// Form contents that passed every rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub header: NewResponseHeader,
    /// Trimmed, non-blank labels in slot order
    pub labels: Vec<String>,
}

/// Check a length-bounded text field, pushing the matching error
fn check_length(
    errors: &mut Vec<FieldError>,
    field: Field,
    value: &str,
    (min, too_short): (usize, Message),
    (max, too_long): (usize, Message),
    lang: Lang,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, too_short, lang));
    } else if len > max {
        errors.push(FieldError::new(field, too_long, lang));
    }
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_PATTERN.is_match(mobile)
}

/// Validate form contents, returning every field error at once
pub fn validate(input: &SurveyInput, lang: Lang) -> Result<ValidSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = input.name.trim();
    check_length(
        &mut errors,
        Field::Name,
        name,
        (NAME_MIN, Message::NameTooShort),
        (NAME_MAX, Message::NameTooLong),
        lang,
    );

    let mobile = input.mobile.trim();
    if !is_valid_mobile(mobile) {
        errors.push(FieldError::new(Field::Mobile, Message::MobileInvalid, lang));
    }

    let location = input.location.trim();
    check_length(
        &mut errors,
        Field::Location,
        location,
        (LOCATION_MIN, Message::LocationRequired),
        (LOCATION_MAX, Message::LocationTooLong),
        lang,
    );

    let ward = input.ward.trim();
    check_length(
        &mut errors,
        Field::Ward,
        ward,
        (WARD_MIN, Message::WardRequired),
        (WARD_MAX, Message::WardTooLong),
        lang,
    );

    let role = input
        .role
        .as_deref()
        .and_then(|r| r.trim().parse::<Role>().ok());
    if role.is_none() {
        errors.push(FieldError::new(Field::Role, Message::RoleRequired, lang));
    }

    let mut labels = Vec::new();
    for (index, slot) in input.items.iter().enumerate() {
        let label = slot.trim();
        if label.is_empty() {
            continue;
        }
        let len = label.chars().count();
        if len < ITEM_MIN {
            errors.push(FieldError::at(Field::Items, index, Message::ItemTooShort, lang));
        } else if len > ITEM_MAX {
            errors.push(FieldError::at(Field::Items, index, Message::ItemTooLong, lang));
        }
        labels.push(label.to_string());
    }
    if labels.is_empty() {
        errors.push(FieldError::new(Field::Items, Message::ItemsRequired, lang));
    }

    match role {
        Some(role) if errors.is_empty() => Ok(ValidSubmission {
            header: NewResponseHeader {
                name: name.to_string(),
                mobile: mobile.to_string(),
                location: location.to_string(),
                ward: ward.to_string(),
                role,
            },
            labels,
        }),
        _ => Err(errors),
    }
}
