use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Request fields the body rejections can refer to.
const FIELDS: [&str; 3] = ["question", "session_id", "top_k"];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_field(msg: &str) -> Option<&'static str> {
    FIELDS.into_iter().find(|f| msg.contains(f))
}

fn hint_for(msg: &str) -> Option<&'static str> {
    if msg.contains("missing field `question`") {
        Some("Send a JSON object like { \"question\": \"...\" }.")
    } else if msg.contains("invalid type") && msg.contains("top_k") {
        Some("`top_k` must be a non-negative integer.")
    } else if msg.contains("Content-Type") {
        Some("Set the header `Content-Type: application/json`.")
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts
        .headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(v) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", v);
    }
    id
}

/// Rewrites axum's plain-text body rejections (400/415/422) into the
/// [`ApiResponse`] error envelope. Other responses pass through untouched.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => return res,
    };

    // Already an envelope.
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let request_id = ensure_request_id(&mut parts);
    debug!(%request_id, %status, body = %original.trim(), "mapping body rejection");

    let envelope = ApiResponse::<()>::error(
        code,
        original.trim(),
        vec![ApiErrorDetail::field(guess_field(&original), hint_for(&original))],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_field_and_hint() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `question` at line 1 column 2";
        assert_eq!(guess_field(msg), Some("question"));
        assert!(hint_for(msg).is_some());
        assert_eq!(guess_field("EOF while parsing"), None);
    }
}
