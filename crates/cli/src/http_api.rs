use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Response as HttpResponse, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tfplan_extractor::{ExtractorError, PlanAnalyzer};
use tfplan_protocol::{serialize_json, ErrorBody, ErrorEnvelope, HealthStatus};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub const UPLOAD_PATH: &str = "/api/upload";
pub const HEALTH_PATH: &str = "/api/health";

const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct HttpState {
    analyzer: Arc<PlanAnalyzer>,
}

impl HttpState {
    pub fn new(analyzer: PlanAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Router with the upload and health endpoints, CORS and the body limit applied.
pub fn build_router(state: HttpState, server: &ServerConfig) -> Result<Router> {
    let mut app = Router::new()
        .route(UPLOAD_PATH, post(http_upload))
        .route(HEALTH_PATH, get(http_health))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .with_state(state);

    if !server.cors_origins.is_empty() {
        app = app.layer(cors_layer(&server.cors_origins)?);
    }
    Ok(app)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    // credentials forbid wildcards, so methods and headers echo the preflight
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn http_upload(
    State(state): State<HttpState>,
    mut multipart: Multipart,
) -> Result<Response, StatusCode> {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(UPLOAD_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((filename, bytes)),
                    Err(err) => {
                        return build_response(
                            err.status(),
                            error_envelope("bad_input_shape", err.body_text(), None),
                        )
                    }
                }
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => {
                return build_response(
                    err.status(),
                    error_envelope("bad_input_shape", err.body_text(), None),
                )
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        return build_response(
            StatusCode::BAD_REQUEST,
            error_envelope(
                "bad_input_shape",
                format!("Missing multipart field '{UPLOAD_FIELD}'"),
                None,
            ),
        );
    };
    if !filename.ends_with(".json") {
        return build_response(
            StatusCode::BAD_REQUEST,
            error_envelope(
                "bad_input_shape",
                "File must be a JSON file".to_string(),
                None,
            ),
        );
    }

    log::info!("upload {filename}: {} bytes", bytes.len());
    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&bytes))
        .await
        .map_err(|err| {
            log::error!("analysis task failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match result {
        Ok(response) => {
            let bytes = serialize_json(&response)
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                .into_bytes();
            json_response(StatusCode::OK, bytes)
        }
        Err(err) => {
            let status = match err {
                ExtractorError::PlanNotFound { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            build_response(status, extractor_error(&err))
        }
    }
}

async fn http_health() -> Result<Response, StatusCode> {
    let bytes = serde_json::to_vec(&HealthStatus { ok: true })
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    json_response(StatusCode::OK, bytes)
}

fn extractor_error(err: &ExtractorError) -> ErrorEnvelope {
    let details = match err {
        ExtractorError::PlanNotFound {
            objects_scanned,
            diagnostics_scanned,
        } => Some(serde_json::json!({
            "objects_scanned": objects_scanned,
            "diagnostics_scanned": diagnostics_scanned,
        })),
        _ => None,
    };
    error_envelope(err.code(), err.to_string(), details)
}

fn error_envelope(
    code: &str,
    message: String,
    details: Option<serde_json::Value>,
) -> ErrorEnvelope {
    let hint = match code {
        "bad_input_shape" => Some(
            "Upload the output of `terraform show -json` as a multipart field named 'file' with a .json filename."
                .to_string(),
        ),
        "plan_not_found" => Some(
            "The upload had no recognizable plan JSON, diagnostics, or JSON objects. Check that the file is not empty or binary."
                .to_string(),
        ),
        _ => None,
    };

    ErrorEnvelope {
        code: code.to_string(),
        message,
        details,
        hint,
    }
}

fn build_response(status: StatusCode, envelope: ErrorEnvelope) -> Result<Response, StatusCode> {
    let bytes = serialize_json(&ErrorBody::new(envelope))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();
    json_response(status, bytes)
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Result<Response, StatusCode> {
    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_envelope_carries_counts() {
        let envelope = extractor_error(&ExtractorError::PlanNotFound {
            objects_scanned: 0,
            diagnostics_scanned: 0,
        });
        assert_eq!(envelope.code, "plan_not_found");
        assert_eq!(
            envelope.details,
            Some(serde_json::json!({"objects_scanned": 0, "diagnostics_scanned": 0}))
        );
        assert!(envelope.hint.is_some());
    }

    #[test]
    fn cors_rejects_invalid_origin() {
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
