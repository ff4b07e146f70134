//! HTTP routes for the survey service
//!
//! Handlers take a request whose body has already been collected, so they can
//! be driven directly in tests.

pub mod admin;
pub mod health;
pub mod survey;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Request, Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::{extract_token_from_cookie, extract_token_from_header};
use crate::i18n::Lang;

pub use admin::handle_admin_request;
pub use health::{health_check, version_info};
pub use survey::{handle_list_locations, handle_submit_survey};

pub type FullBody = Full<Bytes>;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    code: Option<&str>,
) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// 303 to `location` carrying a JSON body, optionally clearing the session cookie
pub(crate) fn redirect_response<T: Serialize>(
    location: &str,
    body: &T,
    clear_session: bool,
) -> Response<FullBody> {
    let mut response = json_response(StatusCode::SEE_OTHER, body);
    let headers = response.headers_mut();
    if let Ok(value) = header::HeaderValue::from_str(location) {
        headers.insert(header::LOCATION, value);
    }
    if clear_session {
        headers.insert(
            header::SET_COOKIE,
            header::HeaderValue::from_static("session=; Path=/; Max-Age=0; HttpOnly"),
        );
    }
    response
}

/// Decoded query string parameters
pub(crate) fn query_params<B>(req: &Request<B>) -> HashMap<String, String> {
    req.uri()
        .query()
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}

/// `?confirm=true` on destructive requests
pub(crate) fn is_confirmed(params: &HashMap<String, String>) -> bool {
    params
        .get("confirm")
        .is_some_and(|v| matches!(v.as_str(), "true" | "1" | "yes"))
}

/// Working language: `?lang=`, then `Accept-Language` if `negotiate`, then `fallback`
pub(crate) fn request_lang<B>(req: &Request<B>, negotiate: bool, fallback: Lang) -> Lang {
    if let Some(lang) = query_params(req).get("lang").and_then(|l| l.parse().ok()) {
        return lang;
    }

    if negotiate {
        if let Some(lang) = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Lang::from_accept_language)
        {
            return lang;
        }
    }

    fallback
}

/// Session token from the Authorization header or the `session` cookie
pub(crate) fn request_token<B>(req: &Request<B>) -> Option<&str> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(token) = extract_token_from_header(auth_header) {
        return Some(token);
    }

    let cookie_header = req.headers().get(header::COOKIE).and_then(|v| v.to_str().ok());
    extract_token_from_cookie(cookie_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Bytes> {
        Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_lang_query_wins() {
        let req = Request::builder()
            .uri("/api/locations?lang=en")
            .header("Accept-Language", "ml-IN")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(request_lang(&req, true, Lang::Ml), Lang::En);
    }

    #[test]
    fn test_lang_negotiation() {
        let req = Request::builder()
            .uri("/api/locations")
            .header("Accept-Language", "en-GB,en;q=0.9")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(request_lang(&req, true, Lang::Ml), Lang::En);
        assert_eq!(request_lang(&req, false, Lang::Ml), Lang::Ml);
    }

    #[test]
    fn test_confirm_param() {
        assert!(is_confirmed(&query_params(&request("/x?confirm=true"))));
        assert!(!is_confirmed(&query_params(&request("/x?confirm=no"))));
        assert!(!is_confirmed(&query_params(&request("/x"))));
    }

    #[test]
    fn test_token_from_cookie_or_header() {
        let req = Request::builder()
            .uri("/admin")
            .header("Cookie", "a=b; session=tok")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(request_token(&req), Some("tok"));

        let req = Request::builder()
            .uri("/admin")
            .header("Authorization", "Bearer abc")
            .header("Cookie", "session=tok")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(request_token(&req), Some("abc"));
    }
}
