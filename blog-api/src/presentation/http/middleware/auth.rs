use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

/// Caller identity decoded from the bearer token, valid for one request.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) id: i64,
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(request.headers(), &state.jwt)?;
    debug!(user_id = user.id, username = %user.username, "request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// No header, or a scheme with no token after it, means the caller never
/// tried to authenticate. Anything else that fails is an invalid token.
pub(crate) fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthenticatedUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthenticated)?;
    let token = parts.next().ok_or(AppError::Unauthenticated)?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidToken);
    }

    let claims = jwt.verify_token(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        AppError::InvalidToken
    })?;

    Ok(AuthenticatedUser {
        id: claims.id,
        username: claims.username,
    })
}
