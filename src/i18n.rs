//! Malayalam / English message catalogue
//!
//! Every validation message and notification the service emits has an entry
//! here. The public form works in Malayalam by default, the admin dashboard
//! in English.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Working language of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ml,
    En,
}

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Ml => "ml",
            Lang::En => "en",
        }
    }

    /// First supported language in an `Accept-Language` header, ignoring weights
    pub fn from_accept_language(header: &str) -> Option<Lang> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| {
                let primary = tag.split('-').next().unwrap_or("");
                primary.parse().ok()
            })
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ml" | "malayalam" => Ok(Lang::Ml),
            "en" | "english" => Ok(Lang::En),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// Catalogue keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    // Form validation
    NameTooShort,
    NameTooLong,
    MobileInvalid,
    LocationRequired,
    LocationTooLong,
    WardRequired,
    WardTooLong,
    RoleRequired,
    ItemTooShort,
    ItemTooLong,
    ItemsRequired,

    // Public form notifications
    SurveySubmitted,
    SurveySubmitFailed,
    LocationsLoadFailed,

    // Reference data manager
    LocationNameRequired,
    WardCountInvalid,
    LocationAdded,
    LocationUpdated,
    LocationDeleted,
    LocationDeleteFailed,
    LocationDeleteConfirm,
    OperationFailed,

    // Response browser
    SurveysLoadFailed,
    SurveyDeleted,
    SurveyDeleteFailed,
    SurveyDeleteConfirm,

    // Demand aggregator
    DemandLoadFailed,

    // Admin shell
    AccessDenied,
    LoggedOut,
}

impl Message {
    /// Text for the message in the given language
    pub fn text(self, lang: Lang) -> &'static str {
        match lang {
            Lang::Ml => self.malayalam(),
            Lang::En => self.english(),
        }
    }

    fn malayalam(self) -> &'static str {
        match self {
            Message::NameTooShort => "പേര് കുറഞ്ഞത് 2 അക്ഷരങ്ങളായിരിക്കണം",
            Message::NameTooLong => "പേര് 100 അക്ഷരങ്ങളിൽ കുറവായിരിക്കണം",
            Message::MobileInvalid => "സാധുവായ 10 അക്ക മൊബൈൽ നമ്പർ നൽകുക",
            Message::LocationRequired => "പഞ്ചായത്ത് ആവശ്യമാണ്",
            Message::LocationTooLong => "പഞ്ചായത്ത് 100 അക്ഷരങ്ങളിൽ കുറവായിരിക്കണം",
            Message::WardRequired => "വാർഡ് ആവശ്യമാണ്",
            Message::WardTooLong => "വാർഡ് 50 അക്ഷരങ്ങളിൽ കുറവായിരിക്കണം",
            Message::RoleRequired => "ഉപയോക്താവിന്റെ തരം തിരഞ്ഞെടുക്കുക",
            Message::ItemTooShort => "ഉൽപ്പന്നം/സേവനം കുറഞ്ഞത് 2 അക്ഷരങ്ങളായിരിക്കണം",
            Message::ItemTooLong => "ഉൽപ്പന്നം/സേവനം 200 അക്ഷരങ്ങളിൽ കുറവായിരിക്കണം",
            Message::ItemsRequired => "കുറഞ്ഞത് ഒരു ഉൽപ്പന്നം/സേവനം ചേർക്കുക",
            Message::SurveySubmitted => "സർവേ വിജയകരമായി സമർപ്പിച്ചു!",
            Message::SurveySubmitFailed => "സർവേ സമർപ്പിക്കുന്നതിൽ പിശക്",
            Message::LocationsLoadFailed => "പഞ്ചായത്തുകൾ ലോഡ് ചെയ്യുന്നതിൽ പിശക്",
            Message::LocationNameRequired => "പേര് ആവശ്യമാണ്",
            Message::WardCountInvalid => "വാർഡുകളുടെ എണ്ണം കുറഞ്ഞത് 1 ആയിരിക്കണം",
            Message::LocationAdded => "പഞ്ചായത്ത് വിജയകരമായി ചേർത്തു",
            Message::LocationUpdated => "പഞ്ചായത്ത് വിജയകരമായി പുതുക്കി",
            Message::LocationDeleted => "പഞ്ചായത്ത് വിജയകരമായി നീക്കം ചെയ്തു",
            Message::LocationDeleteFailed => "പഞ്ചായത്ത് നീക്കം ചെയ്യുന്നതിൽ പിശക്",
            Message::LocationDeleteConfirm => "ഈ പഞ്ചായത്ത് നീക്കം ചെയ്യണമെന്ന് ഉറപ്പാണോ?",
            Message::OperationFailed => "പ്രവർത്തനം പരാജയപ്പെട്ടു",
            Message::SurveysLoadFailed => "സർവേകൾ ലോഡ് ചെയ്യുന്നതിൽ പിശക്",
            Message::SurveyDeleted => "സർവേ വിജയകരമായി നീക്കം ചെയ്തു",
            Message::SurveyDeleteFailed => "സർവേ നീക്കം ചെയ്യുന്നതിൽ പിശക്",
            Message::SurveyDeleteConfirm => "ഈ സർവേ നീക്കം ചെയ്യണമെന്ന് ഉറപ്പാണോ?",
            Message::DemandLoadFailed => "ഡാറ്റ ലോഡ് ചെയ്യുന്നതിൽ പിശക്",
            Message::AccessDenied => "പ്രവേശനം നിഷേധിച്ചു",
            Message::LoggedOut => "വിജയകരമായി ലോഗ് ഔട്ട് ചെയ്തു",
        }
    }

    fn english(self) -> &'static str {
        match self {
            Message::NameTooShort => "Name must be at least 2 characters",
            Message::NameTooLong => "Name must be less than 100 characters",
            Message::MobileInvalid => "Enter a valid 10-digit mobile number",
            Message::LocationRequired => "Panchayath is required",
            Message::LocationTooLong => "Panchayath must be less than 100 characters",
            Message::WardRequired => "Ward is required",
            Message::WardTooLong => "Ward must be less than 50 characters",
            Message::RoleRequired => "Select who you are",
            Message::ItemTooShort => "Product/service must be at least 2 characters",
            Message::ItemTooLong => "Product/service must be less than 200 characters",
            Message::ItemsRequired => "Add at least one product/service",
            Message::SurveySubmitted => "Survey submitted successfully!",
            Message::SurveySubmitFailed => "Error submitting survey",
            Message::LocationsLoadFailed => "Failed to fetch panchayaths",
            Message::LocationNameRequired => "Name is required",
            Message::WardCountInvalid => "Ward count must be at least 1",
            Message::LocationAdded => "Panchayath added successfully",
            Message::LocationUpdated => "Panchayath updated successfully",
            Message::LocationDeleted => "Panchayath deleted successfully",
            Message::LocationDeleteFailed => "Failed to delete panchayath",
            Message::LocationDeleteConfirm => "Are you sure you want to delete this panchayath?",
            Message::OperationFailed => "Operation failed",
            Message::SurveysLoadFailed => "Failed to fetch surveys",
            Message::SurveyDeleted => "Survey deleted successfully",
            Message::SurveyDeleteFailed => "Failed to delete survey",
            Message::SurveyDeleteConfirm => "Are you sure you want to delete this survey?",
            Message::DemandLoadFailed => "Failed to fetch data",
            Message::AccessDenied => "Access denied",
            Message::LoggedOut => "Logged out successfully",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language_picks_first_supported() {
        assert_eq!(Lang::from_accept_language("ml-IN,en;q=0.8"), Some(Lang::Ml));
        assert_eq!(Lang::from_accept_language("fr-FR, en-GB;q=0.7"), Some(Lang::En));
        assert_eq!(Lang::from_accept_language("de, fr"), None);
    }

    #[test]
    fn test_lang_codes() {
        assert_eq!("EN".parse::<Lang>().unwrap(), Lang::En);
        assert_eq!(Lang::default(), Lang::Ml);
        assert!("ta".parse::<Lang>().is_err());
    }

    #[test]
    fn test_both_languages_present() {
        assert_eq!(
            Message::ItemsRequired.text(Lang::Ml),
            "കുറഞ്ഞത് ഒരു ഉൽപ്പന്നം/സേവനം ചേർക്കുക"
        );
        assert_eq!(Message::AccessDenied.text(Lang::En), "Access denied");
    }
}
