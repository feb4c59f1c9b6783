//! Activity analytics handlers

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::User;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousActivityParams {
    /// Start of the time range (RFC 3339).
    pub from: DateTime<Utc>,
    /// End of the time range (RFC 3339).
    pub to: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub transactions_threshold: i64,
}

/// List users with an unusually high number of transactions in a range.
///
/// `GET /analytics/suspicious-activity` - volume-only anomaly scan across
/// all users, intended for offline review rather than the per-request
/// fraud verdict.
pub async fn suspicious_activity(
    State(state): State<AppState>,
    Query(params): Query<SuspiciousActivityParams>,
) -> AppResult<Json<Vec<User>>> {
    params
        .validate()
        .map_err(|e| AppError::InvalidThreshold(e.to_string()))?;

    if params.to < params.from {
        return Err(AppError::Validation(
            "time range end precedes its start".to_string(),
        ));
    }

    let users = User::list_with_anomalous_volume(
        &state.pool,
        params.from,
        params.to,
        params.transactions_threshold,
    )
    .await?;

    Ok(Json(users))
}
