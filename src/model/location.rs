//! Panchayath reference data

use serde::{Deserialize, Serialize};

/// A panchayath with its ward count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    /// Canonical (English) name; responses reference this string
    pub name: String,
    /// Malayalam name, shown in the public form when present
    pub name_ml: Option<String>,
    pub ward_count: u32,
}

impl Location {
    /// Label for the form's selector
    pub fn display_name(&self) -> &str {
        self.name_ml
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Editable fields of a panchayath
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInput {
    pub name: String,
    #[serde(default)]
    pub name_ml: Option<String>,
    #[serde(default = "default_ward_count")]
    pub ward_count: u32,
}

fn default_ward_count() -> u32 {
    1
}

impl Default for LocationInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            name_ml: None,
            ward_count: default_ward_count(),
        }
    }
}

impl LocationInput {
    /// Trim text fields and store a blank Malayalam name as absent
    pub fn normalized(self) -> Self {
        let name_ml = self
            .name_ml
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Self {
            name: self.name.trim().to_string(),
            name_ml,
            ward_count: self.ward_count,
        }
    }
}

/// Body of an edit: unlike a new entry, the ward count must be given
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationUpdate {
    pub name: String,
    #[serde(default)]
    pub name_ml: Option<String>,
    pub ward_count: u32,
}

impl From<LocationUpdate> for LocationInput {
    fn from(update: LocationUpdate) -> Self {
        Self {
            name: update.name,
            name_ml: update.name_ml,
            ward_count: update.ward_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefers_malayalam() {
        let mut location = Location {
            id: "1".into(),
            name: "Aluva".into(),
            name_ml: Some("ആലുവ".into()),
            ward_count: 26,
        };
        assert_eq!(location.display_name(), "ആലുവ");

        location.name_ml = None;
        assert_eq!(location.display_name(), "Aluva");
    }

    #[test]
    fn test_normalized_drops_blank_malayalam_name() {
        let input = LocationInput {
            name: "  Kalady ".into(),
            name_ml: Some("   ".into()),
            ward_count: 17,
        }
        .normalized();

        assert_eq!(input.name, "Kalady");
        assert_eq!(input.name_ml, None);
    }

    #[test]
    fn test_ward_count_defaults_to_one() {
        let input: LocationInput = serde_json::from_str(r#"{"name":"Edathala"}"#).unwrap();
        assert_eq!(input.ward_count, 1);
        assert_eq!(LocationInput::default().ward_count, 1);
    }

    #[test]
    fn test_update_requires_ward_count() {
        let missing = serde_json::from_str::<LocationUpdate>(r#"{"name":"Aluva"}"#);
        assert!(missing.is_err());

        let update: LocationUpdate =
            serde_json::from_str(r#"{"name":"Aluva","ward_count":22}"#).unwrap();
        assert_eq!(LocationInput::from(update).ward_count, 22);
    }
}
