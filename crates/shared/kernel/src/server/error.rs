use crate::error::{Classify, ErrorBody, ErrorKind};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::error::Error;
use tracing::error;

/// Rejection type of every handler.
///
/// Any classified slice error converts into it with `?`; the status code is
/// derived from its [`ErrorKind`] alone.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    #[must_use]
    pub const fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { status: Self::status_for(kind), body: ErrorBody::new(kind, message) }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Validation, message);
        err.body.field = Some(field.to_owned());
        err
    }

    /// No identity headers on a protected route.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorBody::new(ErrorKind::Forbidden, message),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl<E> From<E> for ApiError
where
    E: Classify + Error,
{
    fn from(err: E) -> Self {
        let body = ErrorBody::from_error(&err);
        if body.kind == ErrorKind::Internal {
            error!(error = %err, "Request failed");
        }
        Self { status: Self::status_for(body.kind), body }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{AccessDenied, Actor};
    use fhub_domain::security::Role;

    crate::operation!(ManageRates, "manage_rates", MANAGE_RATES);

    #[test]
    fn classified_errors_map_to_status() {
        let denied: AccessDenied =
            Actor::new("user:c", "C", Role::Client).authorize::<ManageRates>().unwrap_err();
        let err = ApiError::from(denied);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body().kind, ErrorKind::Forbidden);

        assert_eq!(ApiError::status_for(ErrorKind::BusinessRule), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
    }
}
