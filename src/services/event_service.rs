//! Event persistence operations and the single business rule they enforce.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::EventError;
use crate::models::ids::EventId;
use crate::models::{Event, EventPatch, NewEvent};

/// End must land strictly after start when both are present.
pub fn validate_event_times(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), EventError> {
    if let Some(end) = end {
        if end <= start {
            return Err(EventError::BusinessRule(
                "End datetime must be after start datetime".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn create_event(pool: &PgPool, input: NewEvent) -> Result<Event, EventError> {
    validate_event_times(input.start_datetime, input.end_datetime)?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (id, title, description, start_datetime, end_datetime, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING id, title, description, start_datetime, end_datetime, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.title)
    .bind(input.description.as_deref())
    .bind(input.start_datetime)
    .bind(input.end_datetime)
    .fetch_one(pool)
    .await
    .map_err(|e| EventError::from_database("creation", e))?;

    tracing::info!("Event created with ID: {}", event.id);
    Ok(event)
}

pub async fn get_event(pool: &PgPool, event_id: EventId) -> Result<Event, EventError> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, start_datetime, end_datetime, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| EventError::from_database("retrieval", e))?;

    event.ok_or_else(|| EventError::NotFound(event_id.to_string()))
}

pub async fn update_event(
    pool: &PgPool,
    event_id: EventId,
    patch: EventPatch,
) -> Result<Event, EventError> {
    let current = get_event(pool, event_id).await?;

    if patch.is_empty() {
        tracing::info!("No fields to update for event ID: {}", event_id);
        return Ok(current);
    }

    // Merge the patch over the stored row so the rule sees the final values.
    let title = patch.title.unwrap_or(current.title);
    let description = patch.description.or(current.description);
    let start_datetime = patch.start_datetime.unwrap_or(current.start_datetime);
    let end_datetime = patch.end_datetime.or(current.end_datetime);

    validate_event_times(start_datetime, end_datetime)?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET title = $1, description = $2, start_datetime = $3, end_datetime = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING id, title, description, start_datetime, end_datetime, created_at, updated_at
        "#,
    )
    .bind(&title)
    .bind(description.as_deref())
    .bind(start_datetime)
    .bind(end_datetime)
    .bind(event_id)
    .fetch_one(pool)
    .await
    .map_err(|e| EventError::from_database("update", e))?;

    tracing::info!("Event updated with ID: {}", event_id);
    Ok(event)
}

pub async fn delete_event(pool: &PgPool, event_id: EventId) -> Result<(), EventError> {
    get_event(pool, event_id).await?;

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await
        .map_err(|e| EventError::from_database("deletion", e))?;

    tracing::info!("Event deleted with ID: {}", event_id);
    Ok(())
}

pub async fn list_events(
    pool: &PgPool,
    config: &Config,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<Event>, EventError> {
    let limit = match limit {
        Some(limit) => limit.min(config.pagination_max_limit),
        None => config.pagination_default_limit,
    };

    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, start_datetime, end_datetime, created_at, updated_at
        FROM events
        ORDER BY start_datetime ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| EventError::from_database("listing", e))?;

    tracing::debug!(
        "Retrieved {} events with offset={}, limit={}",
        events.len(),
        offset,
        limit
    );
    Ok(events)
}
