//! Push subscription queries.

use sqlx::PgPool;

use order_reminders_core::{SubscriptionId, UserId};

use super::RepositoryError;
use crate::models::PushSubscription;

/// Get all subscriptions registered by a user, oldest first.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_subscriptions_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<PushSubscription>, RepositoryError> {
    let subscriptions = sqlx::query_as::<_, PushSubscription>(
        r"
        SELECT id, user_id, endpoint, p256dh, auth, created_at
        FROM push_subscriptions
        WHERE user_id = $1
        ORDER BY id ASC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}

/// Delete a subscription by ID.
///
/// Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns error if the database delete fails.
pub async fn delete_subscription(
    pool: &PgPool,
    subscription_id: SubscriptionId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
        .bind(subscription_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a subscription by its push endpoint.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns error if the database delete fails.
pub async fn delete_subscription_by_endpoint(
    pool: &PgPool,
    endpoint: &str,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
        .bind(endpoint)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
