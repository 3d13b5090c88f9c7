//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body that is read into memory for logging.
///
/// File uploads are not read and are left to the size limit of their route.
pub const MAX_LOGGED_REQUEST_SIZE: usize = 1024 * 1024;

const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

const FILE_CONTENT_TYPES: [&str; 2] = ["multipart/form-data", "application/octet-stream"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in
/// URL encoded forms are redacted.
///
/// File uploads and downloads are streamed through untouched and only their
/// `Content-Length` is logged. Any other request body larger than
/// [MAX_LOGGED_REQUEST_SIZE] is rejected with `413 Payload Too Large`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let request = if is_file_body(&parts.headers) {
        tracing::info!(
            "Received request: {} {}\nheaders: {:#?}\nbody: {}",
            parts.method,
            parts.uri,
            parts.headers,
            describe_file_body(&parts.headers)
        );

        Request::from_parts(parts, body)
    } else {
        if content_length(&parts.headers).is_some_and(|length| length > MAX_LOGGED_REQUEST_SIZE) {
            tracing::warn!(
                "Rejected request {} {}: body larger than {MAX_LOGGED_REQUEST_SIZE} bytes",
                parts.method,
                parts.uri
            );
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }

        let body = match axum::body::to_bytes(body, MAX_LOGGED_REQUEST_SIZE).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(
                    "could not read request body of {} {}: {error}",
                    parts.method,
                    parts.uri
                );
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
        };

        tracing::info!(
            "Received request: {} {}\nheaders: {:#?}\nbody: {}",
            parts.method,
            parts.uri,
            parts.headers,
            loggable_body(&parts.headers, &body, LOG_BODY_LENGTH_LIMIT)
        );
        if body.len() > LOG_BODY_LENGTH_LIMIT {
            tracing::debug!(
                "Full request body: {}",
                loggable_body(&parts.headers, &body, usize::MAX)
            );
        }

        Request::from_parts(parts, Body::from(body))
    };

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    if is_file_body(&parts.headers) {
        tracing::info!(
            "Sending response: {}\nheaders: {:#?}\nbody: {}",
            parts.status,
            parts.headers,
            describe_file_body(&parts.headers)
        );

        return Response::from_parts(parts, body);
    }

    // Other responses are pages, fragments and CSV exports built by the app itself.
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return (parts.status, parts.headers).into_response();
        }
    };

    tracing::info!(
        "Sending response: {}\nheaders: {:#?}\nbody: {}",
        parts.status,
        parts.headers,
        loggable_body(&parts.headers, &body, LOG_BODY_LENGTH_LIMIT)
    );
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!(
            "Full response body: {}",
            loggable_body(&parts.headers, &body, usize::MAX)
        );
    }

    Response::from_parts(parts, Body::from(body))
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value: &HeaderValue| value.to_str().ok())
        .unwrap_or_default()
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

fn is_file_body(headers: &HeaderMap) -> bool {
    let content_type = content_type(headers);

    FILE_CONTENT_TYPES
        .iter()
        .any(|file_type| content_type.starts_with(file_type))
}

fn describe_file_body(headers: &HeaderMap) -> String {
    let content_type = content_type(headers);

    match content_length(headers) {
        Some(length) => format!("<{length} bytes of {content_type}>"),
        None => format!("<streamed {content_type}>"),
    }
}

/// Render `body` for the log, cut to at most `limit` bytes.
fn loggable_body(headers: &HeaderMap, body: &Bytes, limit: usize) -> String {
    let content_type = content_type(headers);

    let text = String::from_utf8_lossy(body);
    let text = if content_type.starts_with("application/x-www-form-urlencoded") {
        redact_passwords(&text)
    } else {
        text.into_owned()
    };

    truncate(&text, limit)
}

/// Replace the values of password fields in a URL encoded form.
fn redact_passwords(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return "<unparsable form>".to_owned();
    };

    let redacted = fields
        .into_iter()
        .map(|(name, value)| {
            if REDACTED_FIELDS.contains(&name.as_str()) {
                (name, "********".to_owned())
            } else {
                (name, value)
            }
        })
        .collect::<Vec<_>>();

    serde_urlencoded::to_string(redacted).unwrap_or_else(|_| "<unparsable form>".to_owned())
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return format!("{text:?}");
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    format!("{:?}...", &text[..end])
}
