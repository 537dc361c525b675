use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;

/// Acknowledge a logout.
///
/// Tokens are self-contained and nothing is tracked server side, so there is
/// nothing to invalidate; clients drop their tokens.
pub async fn logout() -> ApiSuccess<LogoutResponseData> {
    tracing::debug!("Logout acknowledged");

    ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "logout successful".to_string(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
