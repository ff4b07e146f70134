//! Database schemas
//!
//! MongoDB document structures for the panchayath, survey, survey item and
//! role collections.

mod metadata;
mod panchayath;
mod survey;
mod user_role;

pub use metadata::Metadata;
pub use panchayath::{PanchayathDoc, PANCHAYATH_COLLECTION};
pub use survey::{
    ItemLabelRow, SurveyDoc, SurveyItemDoc, SURVEY_COLLECTION, SURVEY_ITEM_COLLECTION,
};
pub use user_role::{UserRoleDoc, USER_ROLE_COLLECTION};
