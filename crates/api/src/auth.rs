//! Principal extraction from request headers.
//!
//! Authentication is owned by an upstream identity layer; requests arrive
//! carrying a pre-validated `x-user-id` (UUID) and `x-user-role` header
//! pair. Missing or malformed headers reject the request with `401`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{Principal, Role, UserId};

use crate::error::ApiError;

/// The authenticated caller, extracted from trusted headers.
pub struct Caller(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .map(UserId::from_uuid)
            .ok_or_else(|| {
                ApiError::Unauthorized("missing or invalid x-user-id header".to_string())
            })?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| {
                ApiError::Unauthorized("missing or invalid x-user-role header".to_string())
            })?;

        Ok(Caller(Principal { user_id, role }))
    }
}
