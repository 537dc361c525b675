use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn health<S: AuthServicePort>(
    State(state): State<AppState<S>>,
) -> Result<ApiSuccess<HealthData>, ApiError> {
    state
        .auth_service
        .check_health()
        .await
        .map_err(|_| ApiError::ServiceUnavailable("credential store unreachable".to_string()))
        .map(|_| ApiSuccess::new(StatusCode::OK, HealthData { status: "healthy" }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthData {
    pub status: &'static str,
}
