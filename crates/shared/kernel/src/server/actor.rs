use super::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLE_HEADER, ApiError};
use crate::domain::security::Role;
use crate::security::Actor;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

/// Reads the identity forwarded by the authentication proxy.
///
/// `Ok(None)` when no identity was supplied at all.
fn actor_from_headers(headers: &HeaderMap) -> Result<Option<Actor>, ApiError> {
    let (id, role) = match (header(headers, ACTOR_ID_HEADER), header(headers, ACTOR_ROLE_HEADER)) {
        (None, None) => return Ok(None),
        (Some(id), Some(role)) => (id, role),
        _ => return Err(ApiError::unauthenticated("Incomplete actor identity")),
    };
    let role: Role = role
        .parse()
        .map_err(|_| ApiError::validation(ACTOR_ROLE_HEADER, format!("Unknown role '{role}'")))?;
    let name = header(headers, ACTOR_NAME_HEADER).unwrap_or(id);

    Ok(Some(Actor::new(id, name, role)))
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)?
            .ok_or_else(|| ApiError::unauthenticated("Authentication required"))
    }
}

impl<S> OptionalFromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        actor_from_headers(&parts.headers)
    }
}
