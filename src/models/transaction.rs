//! Transaction read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Declined,
    Pending,
    Canceled,
    Refunded,
}

/// A transaction joined with its originating device, as consumed by the
/// risk evaluator.
///
/// Read-only projection fetched fresh per fraud-check request; it is never
/// cached and never written back. Card and device references are optional
/// because a row may lose either reference, and device coordinates are
/// optional because not every device reports a location.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
    pub card_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub device_latitude: Option<f64>,
    pub device_longitude: Option<f64>,
}

impl TransactionRecord {
    /// Coordinates of the originating device, when both are known.
    pub fn device_location(&self) -> Option<(f64, f64)> {
        match (self.device_latitude, self.device_longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// All transactions performed by `user_id` at or after `since`, each
    /// resolved with its device coordinates and payment card reference.
    ///
    /// This is the single read operation the fraud check depends on; how
    /// the rows are produced is of no concern to the evaluator.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT
                t.id, t.user_id, t.amount, t.currency, t.status, t.occurred_at,
                t.card_id, t.device_id,
                d.latitude AS device_latitude,
                d.longitude AS device_longitude
            FROM transactions t
            LEFT JOIN devices d ON d.id = t.device_id
            WHERE t.user_id = $1 AND t.occurred_at >= $2
            ORDER BY t.occurred_at
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_location_requires_both_coordinates() {
        let mut record = TransactionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: 10.0,
            currency: "EUR".to_string(),
            status: TransactionStatus::Approved,
            occurred_at: Utc::now(),
            card_id: None,
            device_id: Some(Uuid::new_v4()),
            device_latitude: Some(52.2297),
            device_longitude: None,
        };

        assert_eq!(record.device_location(), None);

        record.device_longitude = Some(21.0122);
        assert_eq!(record.device_location(), Some((52.2297, 21.0122)));
    }
}
