use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::server::api;
use crate::server::page;
use crate::server::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            content_type: "application/json",
            body,
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Dispatch one request. `path` may carry a query string.
pub fn route_request(state: &AppState, method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") | ("GET", "/index.html") => HttpResponse {
            status_code: 200,
            content_type: "text/html; charset=utf-8",
            body: page::index_html(),
        },
        ("GET", "/api/health") => match api::health_payload(state) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/villagers") => match api::villagers_payload(state, path) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("GET", "/api/species") => match api::species_payload(state) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, &err.to_string()),
        },
        ("POST", "/api/estimate") => match api::estimate_payload(state, body) {
            Ok(payload) => HttpResponse::json(payload),
            Err(api::EstimatePayloadError::Parse(err)) => {
                error_response(400, &format!("Invalid request body: {err}"))
            }
            Err(api::EstimatePayloadError::Validation(validation)) => {
                validation_error_response(validation)
            }
            Err(api::EstimatePayloadError::NotFound(message)) => error_response(404, &message),
            Err(api::EstimatePayloadError::Internal(message)) => error_response(500, &message),
        },
        _ => error_response(404, "Route not found"),
    }
}

fn validation_error_response(payload: api::ValidationErrorResponse) -> HttpResponse {
    let fallback = "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\",\n  \"series\": []\n}"
        .to_string();

    HttpResponse {
        status_code: 400,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {},\n  \"series\": []\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
