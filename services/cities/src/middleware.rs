//! Identity resolution from the session cookie

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{
    error::ApiError,
    models::User,
    session::TokenStatus,
    state::AppState,
};

/// Resolve the session cookie to a user
///
/// A missing cookie, a bad or expired token, and a token for a user that no
/// longer exists all resolve to `None`.
pub async fn resolve(state: &AppState, jar: &CookieJar) -> Result<Option<User>, ApiError> {
    let Some(cookie) = jar.get(state.session_service.cookie_name()) else {
        return Ok(None);
    };

    let user_id = match state.session_service.validate(cookie.value()) {
        TokenStatus::Valid(user_id) => user_id,
        status => {
            debug!("Rejected session cookie: {:?}", status);
            return Ok(None);
        }
    };

    let user = state.user_repository.find_by_id(user_id).await?;
    if user.is_none() {
        debug!("Session refers to unknown user {}", user_id);
    }

    Ok(user)
}

/// Authentication middleware for mutating routes
///
/// Rejects with 401 when no user resolves; otherwise the `User` is added to
/// the request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let user = resolve(&state, &jar).await?.ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
