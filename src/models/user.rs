//! User model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Users with an unusually high number of transactions inside the
    /// given time range, ordered by transaction count descending.
    pub async fn list_with_anomalous_volume(
        pool: &PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        transactions_threshold: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM users u
            JOIN transactions t ON t.user_id = u.id
            WHERE t.occurred_at >= $1 AND t.occurred_at <= $2
            GROUP BY u.id
            HAVING COUNT(t.id) >= $3
            ORDER BY COUNT(t.id) DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(transactions_threshold)
        .fetch_all(pool)
        .await
    }
}
