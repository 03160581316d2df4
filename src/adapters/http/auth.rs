use super::error::ApiError;
use crate::domain::progress::UserId;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header set by the upstream session layer once the learner is logged in.
pub const USER_HEADER: &str = "x-user-id";

/// Authenticated learner, as forwarded by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0)
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Invalid user"))
    }
}
