//! Admin dashboard routes
//!
//! Every request passes through [`AdminShell::authorize`] first; visitors
//! without an admin session get a 303 to the authentication entry point.
//!
//! - `GET /admin[?tab=panchayaths|surveys|demanded]` - dashboard
//! - `POST /admin/logout`
//! - `GET|POST /admin/panchayaths`, `PUT|DELETE /admin/panchayaths/{id}`
//! - `GET /admin/surveys`, `DELETE /admin/surveys/{id}`
//! - `GET /admin/demand`
//!
//! Deletes need `?confirm=true`; without it the response is 409 with the
//! confirmation prompt and nothing reaches the store.

use bytes::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{
    error_response, is_confirmed, json_response, query_params, redirect_response, request_lang,
    request_token, FullBody,
};
use crate::admin::{
    Access, ActionOutcome, AdminShell, BrowserStats, DemandAggregator, DemandEntry,
    ReferenceDataManager, ResponseBrowser, SurveyEntry, Tab,
};
use crate::auth::Session;
use crate::i18n::Lang;
use crate::model::{Location, LocationInput, LocationUpdate};
use crate::notify::Notification;
use crate::server::AppState;

enum AdminRoute<'a> {
    Dashboard,
    Logout,
    Panchayaths,
    Panchayath(&'a str),
    Surveys,
    Survey(&'a str),
    Demand,
}

fn parse_route(subpath: &str) -> Option<AdminRoute<'_>> {
    let subpath = subpath.trim_end_matches('/');
    let route = match subpath {
        "" => AdminRoute::Dashboard,
        "/logout" => AdminRoute::Logout,
        "/panchayaths" => AdminRoute::Panchayaths,
        "/surveys" => AdminRoute::Surveys,
        "/demand" => AdminRoute::Demand,
        p => {
            if let Some(id) = p.strip_prefix("/panchayaths/") {
                AdminRoute::Panchayath(id)
            } else if let Some(id) = p.strip_prefix("/surveys/") {
                AdminRoute::Survey(id)
            } else {
                return None;
            }
        }
    };

    match route {
        AdminRoute::Panchayath(id) | AdminRoute::Survey(id)
            if id.is_empty() || id.contains('/') =>
        {
            None
        }
        route => Some(route),
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
struct RedirectBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    user: String,
    tabs: [Tab; 3],
    active_tab: Tab,
    view: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct PanchayathsView<'a> {
    panchayaths: &'a [Location],
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
struct SurveysView<'a> {
    surveys: Vec<SurveyEntry<'a>>,
    stats: BrowserStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
struct DemandView<'a> {
    products: &'a [DemandEntry],
    services: &'a [DemandEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
}

#[derive(Debug, Serialize)]
struct ActionResponse<'a, T: Serialize> {
    #[serde(flatten)]
    outcome: &'a ActionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// Status for a tab read: 502 when the component reported a failed read
fn view_status(notification: &Option<Notification>) -> StatusCode {
    if notification.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    }
}

fn action_response<T: Serialize>(
    outcome: &ActionOutcome,
    done: StatusCode,
    failed: StatusCode,
    data: Option<T>,
) -> Response<FullBody> {
    let status = match outcome {
        ActionOutcome::Done { .. } => done,
        ActionOutcome::Failed { .. } => failed,
        ActionOutcome::ConfirmationRequired { .. } => StatusCode::CONFLICT,
    };
    let data = data.filter(|_| outcome.is_done());
    json_response(status, &ActionResponse { outcome, data })
}

// =============================================================================
// Tab Views
// =============================================================================

async fn panchayaths_view(state: &AppState, lang: Lang) -> (StatusCode, serde_json::Value) {
    let mut manager = ReferenceDataManager::new(Arc::clone(&state.locations), lang);
    let notification = manager.load().await;
    let status = view_status(&notification);
    let view = PanchayathsView {
        panchayaths: manager.locations(),
        notification,
    };
    (status, serde_json::to_value(&view).unwrap_or_default())
}

async fn surveys_view(state: &AppState, lang: Lang) -> (StatusCode, serde_json::Value) {
    let mut browser = ResponseBrowser::new(Arc::clone(&state.responses), lang);
    let notification = browser.load().await;
    let status = view_status(&notification);
    let view = SurveysView {
        surveys: browser.entries(),
        stats: browser.stats(),
        notification,
    };
    (status, serde_json::to_value(&view).unwrap_or_default())
}

async fn demand_view(state: &AppState, lang: Lang) -> (StatusCode, serde_json::Value) {
    let mut aggregator = DemandAggregator::new(Arc::clone(&state.responses), lang);
    let notification = aggregator.load().await;
    let status = view_status(&notification);
    let view = DemandView {
        products: aggregator.products(),
        services: aggregator.services(),
        notification,
    };
    (status, serde_json::to_value(&view).unwrap_or_default())
}

async fn tab_view(state: &AppState, tab: Tab, lang: Lang) -> (StatusCode, serde_json::Value) {
    match tab {
        Tab::Panchayaths => panchayaths_view(state, lang).await,
        Tab::Surveys => surveys_view(state, lang).await,
        Tab::Demanded => demand_view(state, lang).await,
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn handle_admin_request(
    req: Request<Bytes>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let lang = request_lang(&req, false, Lang::En);
    let shell = AdminShell::new(
        Arc::clone(&state.sessions),
        Arc::clone(&state.roles),
        state.args.auth_url.clone(),
        lang,
    );

    let session = match shell.authorize(request_token(&req)).await {
        Access::Granted(session) => session,
        Access::Redirect {
            location,
            notification,
        } => {
            let clear = notification.is_some();
            return redirect_response(&location, &RedirectBody { notification }, clear);
        }
    };

    let subpath = path.strip_prefix("/admin").unwrap_or("");
    let Some(route) = parse_route(subpath) else {
        return error_response(StatusCode::NOT_FOUND, "Not Found", Some("NOT_FOUND"));
    };

    let params = query_params(&req);
    let method = req.method().clone();

    match (method, route) {
        (Method::GET, AdminRoute::Dashboard) => {
            let tab = match params.get("tab").map(|t| t.parse::<Tab>()) {
                None => Tab::default(),
                Some(Ok(tab)) => tab,
                Some(Err(e)) => {
                    return error_response(StatusCode::BAD_REQUEST, &e, Some("UNKNOWN_TAB"))
                }
            };
            let (status, view) = tab_view(&state, tab, lang).await;
            json_response(
                status,
                &DashboardResponse {
                    user: session.email,
                    tabs: Tab::ALL,
                    active_tab: tab,
                    view,
                },
            )
        }

        (Method::POST, AdminRoute::Logout) => handle_logout(&shell, &session).await,

        (Method::GET, AdminRoute::Panchayaths) => {
            let (status, view) = panchayaths_view(&state, lang).await;
            json_response(status, &view)
        }

        (Method::POST, AdminRoute::Panchayaths) => {
            let input: LocationInput = match parse_body(&req) {
                Ok(input) => input,
                Err(resp) => return resp,
            };
            let mut manager = ReferenceDataManager::new(Arc::clone(&state.locations), lang);
            let outcome = manager.create(input).await;
            action_response(
                &outcome,
                StatusCode::CREATED,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(manager.locations()),
            )
        }

        (Method::PUT, AdminRoute::Panchayath(id)) => {
            let update: LocationUpdate = match parse_body(&req) {
                Ok(update) => update,
                Err(resp) => return resp,
            };
            let mut manager = ReferenceDataManager::new(Arc::clone(&state.locations), lang);
            let outcome = manager.update(id, update.into()).await;
            action_response(
                &outcome,
                StatusCode::OK,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(manager.locations()),
            )
        }

        (Method::DELETE, AdminRoute::Panchayath(id)) => {
            let mut manager = ReferenceDataManager::new(Arc::clone(&state.locations), lang);
            let outcome = manager.delete(id, is_confirmed(&params)).await;
            action_response(
                &outcome,
                StatusCode::OK,
                StatusCode::BAD_GATEWAY,
                Some(manager.locations()),
            )
        }

        (Method::GET, AdminRoute::Surveys) => {
            let (status, view) = surveys_view(&state, lang).await;
            json_response(status, &view)
        }

        (Method::DELETE, AdminRoute::Survey(id)) => {
            let mut browser = ResponseBrowser::new(Arc::clone(&state.responses), lang);
            let outcome = browser.delete(id, is_confirmed(&params)).await;
            action_response(
                &outcome,
                StatusCode::OK,
                StatusCode::BAD_GATEWAY,
                Some(SurveysView {
                    surveys: browser.entries(),
                    stats: browser.stats(),
                    notification: None,
                }),
            )
        }

        (Method::GET, AdminRoute::Demand) => {
            let (status, view) = demand_view(&state, lang).await;
            json_response(status, &view)
        }

        (method, _) => {
            debug!("No admin handler for {} {}", method, path);
            error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                Some("METHOD_NOT_ALLOWED"),
            )
        }
    }
}

async fn handle_logout(shell: &AdminShell, session: &Session) -> Response<FullBody> {
    match shell.logout(session).await {
        Access::Redirect {
            location,
            notification,
        } => redirect_response(&location, &RedirectBody { notification }, true),
        Access::Granted(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Logout failed",
            Some("LOGOUT_FAILED"),
        ),
    }
}

#[allow(clippy::result_large_err)]
fn parse_body<T: DeserializeOwned>(req: &Request<Bytes>) -> Result<T, Response<FullBody>> {
    serde_json::from_slice(req.body()).map_err(|e| {
        debug!("Rejected admin body: {}", e);
        error_response(StatusCode::BAD_REQUEST, &e.to_string(), Some("INVALID_JSON"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route() {
        assert!(matches!(parse_route(""), Some(AdminRoute::Dashboard)));
        assert!(matches!(parse_route("/"), Some(AdminRoute::Dashboard)));
        assert!(matches!(
            parse_route("/panchayaths/abc"),
            Some(AdminRoute::Panchayath("abc"))
        ));
        assert!(matches!(parse_route("/surveys/x1/"), Some(AdminRoute::Survey("x1"))));
        assert!(parse_route("/surveys/a/b").is_none());
        assert!(parse_route("/users").is_none());
    }
}
