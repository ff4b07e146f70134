//! Public survey form: validation and the two-write submission

pub mod form;
pub mod validation;

pub use form::{
    load_location_options, submit_survey, FormStatus, LocationOption, SubmissionForm,
    SubmitOutcome, CONFIRMATION_WINDOW,
};
pub use validation::{validate, Field, FieldError, SurveyInput, ValidSubmission};
