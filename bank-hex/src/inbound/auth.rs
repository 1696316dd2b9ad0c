//! Authentication middleware for API key validation.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bank_types::{AuthVerifier, BankRepository, IdentifierGenerator, SecretVerifier};

use super::handlers::AppState;

/// Extracts the API key from the Authorization header.
/// Expected format: "Bearer <api_key>" or just "<api_key>"
fn extract_api_key(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header))
}

/// Authentication middleware that resolves the caller.
///
/// On success the `Principal` is stored in the request extensions for the
/// handlers. Unknown or missing keys get 401.
///
/// Endpoints that bypass authentication:
/// - `/health` - Health check endpoint
/// - `POST /api/bootstrap` - Creates the first API key (only works when no keys exist)
pub async fn auth_middleware<R, V, G>(
    State(state): State<Arc<AppState<R, V, G>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    if request.uri().path() == "/api/bootstrap" && request.method() == axum::http::Method::POST {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let api_key = match extract_api_key(auth_header) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match state.repo.verify(&api_key).await {
        Ok(Some(principal)) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Ok(None) => unauthorized_response("Invalid API key"),
        Err(e) => {
            tracing::error!("API key verification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal server error",
                    "code": 500
                })),
            )
                .into_response()
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}
