//! Contact endpoint handlers.
//!
//! The contact handler runs one submission end to end:
//! 1. Gate on method (preflight, reject non-POST)
//! 2. Decode and validate the form body
//! 3. Compose the notification and send it
//!
//! Every branch ends in a [`HandlerOutcome`], which writes the response.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
        },
        HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::form::{decode_form, ContactSubmission};
use crate::mail::{compose, Mailer};
use crate::Config;

/// Largest form body read from a caller.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// CORS headers set on every contact response.
pub const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    (ACCESS_CONTROL_MAX_AGE, "86400"),
];

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, mailer: impl Mailer) -> Self {
        Self {
            config: Arc::new(config),
            mailer: Arc::new(mailer),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Contact Form
// =============================================================================

/// JSON body of every contact response except the preflight.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Result of handling one contact exchange.
///
/// The two 500 variants look identical to the caller; they are kept apart
/// for the server log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Preflight,
    Success,
    BadRequest,
    MethodNotAllowed,
    TransportFailure,
    UnexpectedFailure,
}

impl HandlerOutcome {
    pub fn status(self) -> StatusCode {
        match self {
            HandlerOutcome::Preflight => StatusCode::NO_CONTENT,
            HandlerOutcome::Success => StatusCode::OK,
            HandlerOutcome::BadRequest => StatusCode::BAD_REQUEST,
            HandlerOutcome::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HandlerOutcome::TransportFailure | HandlerOutcome::UnexpectedFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body, or `None` for the empty preflight response.
    pub fn body(self) -> Option<ContactResponse> {
        let (success, message) = match self {
            HandlerOutcome::Preflight => return None,
            HandlerOutcome::Success => (true, "Message sent successfully!"),
            HandlerOutcome::BadRequest => {
                (false, "Missing required fields. Fill everything out!")
            }
            HandlerOutcome::MethodNotAllowed => (false, "Method Not Allowed"),
            HandlerOutcome::TransportFailure => (
                false,
                "Server error: Could not send email (check server logs).",
            ),
            HandlerOutcome::UnexpectedFailure => {
                (false, "An unexpected server error occurred.")
            }
        };
        Some(ContactResponse { success, message })
    }
}

impl IntoResponse for HandlerOutcome {
    fn into_response(self) -> Response {
        let mut response = match self.body() {
            Some(body) => (self.status(), Json(body)).into_response(),
            None => (self.status(), Body::empty()).into_response(),
        };

        let headers = response.headers_mut();
        for (name, value) in CORS_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        response
    }
}

/// Contact form endpoint, mounted for every method.
///
/// Method names are matched without regard to case, so `post` is a POST.
pub async fn contact(State(state): State<AppState>, request: Request) -> HandlerOutcome {
    let method = request.method().clone();

    if is_method(&method, Method::OPTIONS) {
        return HandlerOutcome::Preflight;
    }

    if !is_method(&method, Method::POST) {
        warn!(method = %method, "contact_method_not_allowed");
        return HandlerOutcome::MethodNotAllowed;
    }

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "contact_body_read_failed");
            return HandlerOutcome::UnexpectedFailure;
        }
    };

    let fields = decode_form(&body);
    info!(
        name = fields.get("name").map(String::as_str).unwrap_or_default(),
        email = fields.get("email").map(String::as_str).unwrap_or_default(),
        field_count = fields.len(),
        "contact_submission_received"
    );

    let submission = match ContactSubmission::from_fields(&fields) {
        Ok(submission) => submission,
        Err(missing) => {
            warn!(missing = %missing, "contact_submission_invalid");
            return HandlerOutcome::BadRequest;
        }
    };

    let message = compose(&submission, &state.config);

    match state.mailer.send(&message).await {
        Ok(()) => {
            info!(to = %message.to, reply_to = %message.reply_to, "contact_email_sent");
            HandlerOutcome::Success
        }
        Err(e) if e.is_transport() => {
            error!(error = %e, "contact_smtp_failed");
            HandlerOutcome::TransportFailure
        }
        Err(e) => {
            error!(error = %e, "contact_unexpected_failure");
            HandlerOutcome::UnexpectedFailure
        }
    }
}

fn is_method(method: &Method, expected: Method) -> bool {
    method.as_str().eq_ignore_ascii_case(expected.as_str())
}
