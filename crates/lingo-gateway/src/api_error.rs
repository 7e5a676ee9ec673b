use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lingo_relay::RelayError;
use serde_json::json;

/// Wire-level error envelope. Every error reply, like every success
/// reply, carries the permissive CORS header so browser badge clients
/// can read the body.
#[derive(Debug, Clone)]
pub(crate) struct RelayApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl RelayApiError {
    pub(crate) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub(crate) fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    pub(crate) fn bad_gateway(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, code, message)
    }

    /// Relay engine failures are server-side contract violations, not
    /// caller mistakes, so they all map to 500 with a stable code.
    pub(crate) fn from_relay(error: RelayError) -> Self {
        let code = match &error {
            RelayError::UnknownModification { .. } => "unknown_modification",
            RelayError::UnknownStatKind { .. } => "unknown_stat_kind",
            RelayError::EmptyResourceList => "empty_resource_list",
            RelayError::MissingParamValue { .. } => "missing_path_param",
            RelayError::MissingKey { .. } => "missing_stat_key",
            RelayError::NotANumber { .. } => "not_a_number",
            RelayError::CountOverflow { .. } => "count_overflow",
            _ => "relay_internal_error",
        };
        Self::internal(code, error.to_string())
    }
}

impl IntoResponse for RelayApiError {
    fn into_response(self) -> Response {
        let error_type = if self.status.is_client_error() {
            "invalid_request_error"
        } else {
            "server_error"
        };
        let body = json!({
            "error": {
                "type": error_type,
                "code": self.code,
                "message": self.message,
            }
        });
        let mut response = (self.status, Json(body)).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_relay_errors_map_to_stable_codes() {
        let error = RelayApiError::from_relay(RelayError::UnknownModification {
            name: "x".to_string(),
        });
        assert_eq!(error.code, "unknown_modification");
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);

        let error = RelayApiError::from_relay(RelayError::EmptyResourceList);
        assert_eq!(error.code, "empty_resource_list");

        let error = RelayApiError::from_relay(RelayError::MissingKey {
            path: "stats".to_string(),
        });
        assert_eq!(error.code, "missing_stat_key");

        let error = RelayApiError::from_relay(RelayError::CountOverflow {
            path: "stringcount".to_string(),
        });
        assert_eq!(error.code, "count_overflow");
    }

    #[test]
    fn error_responses_stay_readable_cross_origin() {
        let response = RelayApiError::not_found("no such badge").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }
}
