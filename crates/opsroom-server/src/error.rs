use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use opsroom_core::OpsError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(OpsError::InvalidStatus(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<OpsError>() {
            match e {
                OpsError::NotInitialized
                | OpsError::InvalidId(_)
                | OpsError::InvalidTimeSlot(_)
                | OpsError::InvalidTemplate { .. }
                | OpsError::DeprecatedFrequency(_)
                | OpsError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                OpsError::TemplateNotFound(_)
                | OpsError::TaskNotFound(_)
                | OpsError::AccountNotFound(_)
                | OpsError::StaffNotFound(_)
                | OpsError::PersonaNotFound(_) => StatusCode::NOT_FOUND,
                OpsError::TemplateExists(_) | OpsError::AccountExists(_) => StatusCode::CONFLICT,
                OpsError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                OpsError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
                OpsError::Io(_) | OpsError::Yaml(_) | OpsError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_maps_to_404() {
        let err = AppError(OpsError::TaskNotFound("t-1".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn account_exists_maps_to_409() {
        let err = AppError(OpsError::AccountExists("acct-1".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_transition_maps_to_422() {
        let err = AppError(
            OpsError::InvalidTransition {
                from: "completed".into(),
                to: "completed".into(),
                reason: "already terminal".into(),
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn precondition_failed_maps_to_412() {
        let err = AppError(OpsError::PreconditionFailed("assign a persona first".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn deprecated_frequency_maps_to_400() {
        let err = AppError(OpsError::DeprecatedFrequency("legacy".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_initialized_maps_to_400() {
        let err = AppError(OpsError::NotInitialized.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = AppError(OpsError::Io(io_err).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_domain_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json_error_object() {
        let err = AppError(OpsError::TaskNotFound("t-9".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
