//! Per-request handler context.
//!
//! Instead of hanging helpers off the transport-layer request/response
//! objects, every handler receives one explicit [`HandlerContext`] bundling
//! the validated parameter source, the response contract, and the shared
//! services. The contract is therefore visible in every handler signature.

use std::sync::Arc;

use axum::Json;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use stockops_core::{ApiError, ApiResult, Envelope, ParamMap, ParamsResult, params};

use crate::app::services::AppServices;

/// Response-contract operations attached to every scaffold request.
///
/// Each builds a finished response; a handler returns exactly one of them,
/// which is what makes double-sends unrepresentable. By convention the HTTP
/// status mirrors the envelope `code`; nothing below enforces that.
#[derive(Debug, Clone, Copy, Default)]
pub struct Responder;

impl Responder {
    pub fn success(&self, msg: impl Into<String>, data: Option<Value>) -> Response {
        envelope_response(Envelope::success(msg, data))
    }

    pub fn fail(&self, error: &ApiError) -> Response {
        tracing::error!(error = %error, "request failed");
        envelope_response(Envelope::fail(error.to_string()))
    }

    pub fn auth_fail(&self, error: &ApiError) -> Response {
        tracing::error!(error = %error, "request rejected: unauthorized");
        envelope_response(Envelope::auth_fail(error.to_string()))
    }
}

fn envelope_response(envelope: Envelope) -> Response {
    let status = StatusCode::from_u16(envelope.code).unwrap_or(StatusCode::OK);
    (status, Json(envelope)).into_response()
}

/// Everything a handler sees: the parameter source mapping (query string
/// for retrieval methods, parsed body otherwise), the responder, and the
/// shared services.
pub struct HandlerContext {
    method: Method,
    source: ParamMap,
    services: Arc<AppServices>,
    responder: Responder,
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("method", &self.method)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl HandlerContext {
    /// Build the context for one request, consuming its body.
    ///
    /// Failures here happen *before* a response contract exists, so they
    /// render through the fallback path.
    pub async fn from_request(
        req: axum::extract::Request,
        services: Arc<AppServices>,
    ) -> ApiResult<Self> {
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();

        let source = if is_retrieval(&method) {
            parse_pairs(parts.uri.query().unwrap_or("").as_bytes())
        } else {
            let limit = services.config.max_body_bytes;
            let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
                if is_length_limit(&err) {
                    ApiError::PayloadTooLarge { limit }
                } else {
                    ApiError::MalformedBody(err.to_string())
                }
            })?;
            parse_body(&parts.headers, &bytes)?
        };

        Ok(Self {
            method,
            source,
            services,
            responder: Responder,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn services(&self) -> &Arc<AppServices> {
        &self.services
    }

    pub fn responder(&self) -> Responder {
        self.responder
    }

    /// Require `keys` from the source mapping; see
    /// [`stockops_core::params::include_only`].
    pub fn include_only(&self, keys: &[&str]) -> ApiResult<ParamsResult> {
        params::include_only(&self.source, keys)
    }

    /// Forbid `keys` in the source mapping; see
    /// [`stockops_core::params::exclude_only`].
    pub fn exclude_only(&self, keys: &[&str]) -> ApiResult<()> {
        params::exclude_only(&self.source, keys)
    }

    #[cfg(test)]
    pub(crate) fn for_test(source: ParamMap, services: Arc<AppServices>) -> Self {
        Self {
            method: Method::GET,
            source,
            services,
            responder: Responder,
        }
    }
}

/// Read-only retrieval methods take their parameters from the query string.
fn is_retrieval(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Decode `key=value` pairs (query string or urlencoded form) into a
/// string-valued mapping.
fn parse_pairs(raw: &[u8]) -> ParamMap {
    let mut map = ParamMap::new();
    for (key, value) in url::form_urlencoded::parse(raw) {
        map.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    map
}

fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> ApiResult<ParamMap> {
    if bytes.is_empty() {
        return Ok(ParamMap::new());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ApiError::MalformedBody(
                "expected a JSON object body".to_owned(),
            )),
            Err(err) => Err(ApiError::MalformedBody(err.to_string())),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        Ok(parse_pairs(bytes))
    } else {
        // Unknown payloads read as an empty mapping; required-parameter
        // validation then reports exactly what is missing.
        Ok(ParamMap::new())
    }
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    use crate::config::{AppConfig, AppMode};

    fn services() -> Arc<AppServices> {
        Arc::new(AppServices::new(AppConfig {
            mode: AppMode::Development,
            port: 0,
            context_path: "/api".to_owned(),
            base_url: "http://127.0.0.1".to_owned(),
            report_dir: std::env::temp_dir(),
            max_body_bytes: 64,
            notify: None,
        }))
    }

    fn request(method: Method, uri: &str, body: Body) -> axum::extract::Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn retrieval_requests_read_the_query_string() {
        let req = request(Method::GET, "/jobs?id=5&sort=asc", Body::empty());
        let ctx = HandlerContext::from_request(req, services()).await.unwrap();

        let result = ctx.include_only(&["id"]).unwrap();
        assert_eq!(result.valid.get("id"), Some(&json!("5")));
        assert_eq!(result.others.get("sort"), Some(&json!("asc")));
    }

    #[tokio::test]
    async fn mutating_requests_read_the_json_body() {
        let req = request(
            Method::POST,
            "/export?id=ignored",
            Body::from(r#"{"file_name":"june","user_id":7}"#),
        );
        let ctx = HandlerContext::from_request(req, services()).await.unwrap();

        let result = ctx.include_only(&["file_name"]).unwrap();
        assert_eq!(result.valid.get("file_name"), Some(&json!("june")));
        assert_eq!(result.others.get("user_id"), Some(&json!(7)));
        assert!(result.valid.get("id").is_none(), "query must not leak in");
    }

    #[tokio::test]
    async fn urlencoded_bodies_are_accepted() {
        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/export")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("file_name=june&user_id=7"))
            .unwrap();
        let ctx = HandlerContext::from_request(req, services()).await.unwrap();

        assert!(ctx.include_only(&["file_name", "user_id"]).is_ok());
    }

    #[tokio::test]
    async fn empty_bodies_read_as_an_empty_mapping() {
        let req = request(Method::POST, "/export", Body::empty());
        let ctx = HandlerContext::from_request(req, services()).await.unwrap();

        let err = ctx.include_only(&["file_name"]).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter { key } if key == "file_name"));
    }

    #[tokio::test]
    async fn invalid_json_is_a_malformed_body() {
        let req = request(Method::POST, "/export", Body::from("{not json"));
        let err = HandlerContext::from_request(req, services())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn non_object_json_is_a_malformed_body() {
        let req = request(Method::POST, "/export", Body::from("[1,2]"));
        let err = HandlerContext::from_request(req, services())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected_with_the_limit() {
        let big = format!(r#"{{"pad":"{}"}}"#, "x".repeat(256));
        let req = request(Method::POST, "/export", Body::from(big));
        let err = HandlerContext::from_request(req, services())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { limit: 64 }));
    }
}
