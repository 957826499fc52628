use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::warn;

use super::models::{AuditLogEntry, NewAuditLog, NewTopic, Topic, TopicDisplay};

// ========== Topics ==========

/// Insert a new topic, returning its ID.
pub async fn insert_topic(pool: &SqlitePool, topic: &NewTopic) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO topics (title, url, description, image_url, created_by_user_id, created_by_tag)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&topic.title)
    .bind(&topic.url)
    .bind(&topic.description)
    .bind(&topic.image_url)
    .bind(&topic.created_by_user_id)
    .bind(&topic.created_by_tag)
    .execute(pool)
    .await
    .context("Failed to insert topic")?;

    Ok(result.last_insert_rowid())
}

/// Get a topic by ID, deleted or not.
pub async fn get_topic(pool: &SqlitePool, id: i64) -> Result<Option<Topic>> {
    sqlx::query_as("SELECT * FROM topics WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch topic")
}

/// Soft-delete a topic. Returns whether a row was actually changed.
///
/// Idempotent: deleting an absent or already-deleted topic returns `false`
/// without error.
pub async fn soft_delete_topic(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE topics SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to soft-delete topic")?;

    Ok(result.rows_affected() > 0)
}

/// List all non-deleted topics, newest first.
///
/// The `id DESC` order is the public feed order (most recently created
/// first), not an incidental artifact.
pub async fn list_active_topics(pool: &SqlitePool) -> Result<Vec<TopicDisplay>> {
    sqlx::query_as(
        r"
        SELECT id, title, url, description, image_url
        FROM topics
        WHERE is_deleted = 0
        ORDER BY id DESC
        ",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list active topics")
}

/// Count non-deleted topics.
pub async fn count_active_topics(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topics WHERE is_deleted = 0")
        .fetch_one(pool)
        .await
        .context("Failed to count active topics")?;
    Ok(count)
}

// ========== Config ==========

/// Get the currently allowed role id, if one is configured.
pub async fn get_allowed_role(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT allowed_role_id FROM config WHERE id = 1")
            .fetch_optional(pool)
            .await
            .context("Failed to fetch allowed role")?;

    Ok(row.and_then(|(role,)| role))
}

/// Set the allowed role id on the singleton config row.
///
/// The row is seeded at migration time; this only ever updates it in place.
pub async fn set_allowed_role(pool: &SqlitePool, role_id: &str) -> Result<()> {
    sqlx::query("UPDATE config SET allowed_role_id = ?, updated_at = datetime('now') WHERE id = 1")
        .bind(role_id)
        .execute(pool)
        .await
        .context("Failed to set allowed role")?;

    Ok(())
}

// ========== Audit log ==========

/// Append an audit log entry, returning its ID.
pub async fn insert_audit_log(pool: &SqlitePool, entry: &NewAuditLog) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO logs (action, topic_id, actor_user_id, actor_tag, detail)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(entry.action.as_str())
    .bind(entry.topic_id)
    .bind(&entry.actor_user_id)
    .bind(&entry.actor_tag)
    .bind(entry.detail.to_string())
    .execute(pool)
    .await
    .context("Failed to insert audit log entry")?;

    Ok(result.last_insert_rowid())
}

/// Append an audit log entry, swallowing failures.
///
/// Audit logging must never fail the mutation it describes.
pub async fn append_log_best_effort(pool: &SqlitePool, entry: &NewAuditLog) {
    if let Err(e) = insert_audit_log(pool, entry).await {
        warn!(action = entry.action.as_str(), "Failed to append audit log: {e:#}");
    }
}

/// Fetch recent audit log entries, newest first.
pub async fn get_recent_audit_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<AuditLogEntry>> {
    sqlx::query_as("SELECT * FROM logs ORDER BY id DESC LIMIT ?")
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to fetch audit log entries")
}
