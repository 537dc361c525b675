use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::errors::INVALID_TOKEN_TYPE;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Middleware that validates access tokens and adds caller info to request
/// extensions. Refresh tokens are refused here.
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = state.authenticator.verify_token(token).map_err(|e| {
        tracing::warn!(reason = %e, "Access token validation failed");
        ApiError::Unauthorized("invalid or expired token".to_string())
    })?;

    if claims.token_type != TokenKind::Access {
        tracing::warn!(user_id = %claims.sub, token_type = %claims.token_type, "Non-access token presented");
        return Err(ApiError::Unauthorized(INVALID_TOKEN_TYPE.to_string()));
    }

    // A correctly signed token must still name a known role.
    claims.role.parse::<Role>().map_err(|e| {
        tracing::error!(user_id = %claims.sub, error = %e, "Token carries an unknown role");
        ApiError::Unauthorized("invalid token format".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: UserId(claims.sub),
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "invalid Authorization header format, expected: Bearer <token>".to_string(),
        )
    })
}
