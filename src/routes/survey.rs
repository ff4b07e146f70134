//! Public survey routes
//!
//! - `GET /api/locations` - selector options
//! - `POST /api/surveys` - submit a response

use bytes::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{error_response, json_response, request_lang, FullBody};
use crate::i18n::Lang;
use crate::model::{ResponseHeader, ResponseLineItem};
use crate::notify::Notification;
use crate::server::AppState;
use crate::survey::{
    load_location_options, submit_survey, FieldError, LocationOption, SubmitOutcome, SurveyInput,
    CONFIRMATION_WINDOW,
};

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub lang: Lang,
    pub options: Vec<LocationOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    pub header: ResponseHeader,
    pub items: Vec<ResponseLineItem>,
    pub notification: Notification,
    /// How long the form shows its confirmation before resetting
    pub confirmation_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct InvalidResponse {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct FailedResponse {
    pub notification: Notification,
}

pub async fn handle_list_locations(req: Request<Bytes>, state: Arc<AppState>) -> Response<FullBody> {
    let lang = request_lang(&req, true, state.args.default_lang);
    let (options, notification) = load_location_options(state.locations.as_ref(), lang).await;

    let status = if notification.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    json_response(
        status,
        &LocationsResponse {
            lang,
            options,
            notification,
        },
    )
}

pub async fn handle_submit_survey(req: Request<Bytes>, state: Arc<AppState>) -> Response<FullBody> {
    let lang = request_lang(&req, true, state.args.default_lang);

    let input: SurveyInput = match serde_json::from_slice(req.body()) {
        Ok(input) => input,
        Err(e) => {
            debug!("Rejected survey body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", Some("INVALID_JSON"));
        }
    };

    match submit_survey(state.responses.as_ref(), &input, lang).await {
        SubmitOutcome::Submitted {
            header,
            items,
            notification,
        } => json_response(
            StatusCode::CREATED,
            &SubmittedResponse {
                header,
                items,
                notification,
                confirmation_secs: CONFIRMATION_WINDOW.as_secs(),
            },
        ),
        SubmitOutcome::Invalid(errors) => {
            json_response(StatusCode::UNPROCESSABLE_ENTITY, &InvalidResponse { errors })
        }
        SubmitOutcome::Failed(notification) => {
            json_response(StatusCode::BAD_GATEWAY, &FailedResponse { notification })
        }
    }
}
