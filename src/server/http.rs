//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::SessionProvider;
use crate::config::Args;
use crate::routes;
use crate::store::{LocationStore, MemoryStore, ResponseStore, RoleStore};
use crate::types::SurveyError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest request body accepted; a full survey with every item slot used
/// stays well below this
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Panchayath reference data
    pub locations: Arc<dyn LocationStore>,
    /// Survey headers and line items
    pub responses: Arc<dyn ResponseStore>,
    /// Admin role grants
    pub roles: Arc<dyn RoleStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        locations: Arc<dyn LocationStore>,
        responses: Arc<dyn ResponseStore>,
        roles: Arc<dyn RoleStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            args,
            locations,
            responses,
            roles,
            sessions,
            started_at: Instant::now(),
        }
    }

    /// All three tables backed by one in-memory store
    pub fn with_memory_store(
        args: Args,
        store: Arc<MemoryStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self::new(args, store.clone(), store.clone(), store, sessions)
    }
}

pub async fn run(state: Arc<AppState>) -> Result<(), SurveyError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Panchayath survey listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - fixed JWT secret in use");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Collect the body, then route
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());

    let (parts, body) = req.into_parts();
    let body = match collect_body(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(response) => {
            warn!("[{}] Rejected request body ({})", addr, response.status());
            return Ok(to_boxed(response));
        }
    };

    Ok(to_boxed(route(state, Request::from_parts(parts, body)).await))
}

/// Buffer a request body of at most `limit` bytes
async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(payload_too_large_response(limit))
        }
        Err(e) => {
            debug!("Failed to read request body: {}", e);
            Err(bad_request_response("Invalid body"))
        }
    }
}

/// Dispatch a request with a collected body
pub async fn route(state: Arc<AppState>, req: Request<Bytes>) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        (Method::GET, "/api/locations") => routes::handle_list_locations(req, state).await,

        (Method::POST, "/api/surveys") => routes::handle_submit_survey(req, state).await,

        (_, p) if p == "/admin" || p.starts_with("/admin/") => {
            routes::handle_admin_request(req, Arc::clone(&state), &path).await
        }

        _ => not_found_response(&path),
    }
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Bad request response
fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Bad Request",
        "message": message
    });

    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Body over the size limit
fn payload_too_large_response(limit: usize) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Payload Too Large",
        "limit": limit,
    });

    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_body_within_limit_is_collected() {
        let body = Full::new(Bytes::from_static(b"{\"name\":\"Anu\"}"));
        let bytes = collect_body(body, MAX_BODY_BYTES).await.unwrap();
        assert_eq!(&bytes[..], b"{\"name\":\"Anu\"}");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let body = Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1]));
        let response = collect_body(body, MAX_BODY_BYTES).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
