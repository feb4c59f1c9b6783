//! Fraud check handler

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::fraud::{evaluate, EvaluationThresholds, Signal};
use crate::models::{TransactionRecord, User};
use crate::{AppError, AppResult, AppState};

/// Risk thresholds supplied per request as query parameters.
///
/// All thresholds must be non-negative and the time window positive;
/// anything else is rejected with 400 before any database work happens.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckParams {
    #[validate(range(min = 0))]
    pub transactions_threshold: i64,
    #[validate(range(min = 1))]
    pub time_window_in_minutes: i64,
    #[validate(range(min = 0.0))]
    pub amount_threshold: f64,
    #[validate(range(min = 0))]
    pub distance_threshold_in_km: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckResponse {
    pub is_fraudulent: bool,
    /// Which signal triggered the verdict; `null` when the activity is clean.
    pub signal: Option<Signal>,
}

/// Check whether a user's recent activity looks fraudulent.
///
/// `GET /users/:user_id/fraud-check` - fetches the user's transactions
/// inside the trailing time window and runs the multi-signal evaluator
/// over that snapshot. 404 when the user id does not resolve.
pub async fn check(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<FraudCheckParams>,
) -> AppResult<Json<FraudCheckResponse>> {
    params
        .validate()
        .map_err(|e| AppError::InvalidThreshold(e.to_string()))?;

    let user = User::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let since = Utc::now() - Duration::minutes(params.time_window_in_minutes);
    let transactions = TransactionRecord::list_recent(&state.pool, user.id, since).await?;

    let thresholds = EvaluationThresholds {
        transaction_count_limit: params.transactions_threshold as usize,
        time_window_minutes: params.time_window_in_minutes,
        amount_limit: params.amount_threshold,
        distance_limit_km: params.distance_threshold_in_km as f64,
    };

    let signal = evaluate(&transactions, &thresholds);
    if let Some(signal) = signal {
        tracing::info!(
            "User {} flagged as fraudulent by the {:?} signal ({} transactions in window)",
            user.id,
            signal,
            transactions.len()
        );
    }

    Ok(Json(FraudCheckResponse {
        is_fraudulent: signal.is_some(),
        signal,
    }))
}
