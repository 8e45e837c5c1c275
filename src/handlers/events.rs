use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EventError, FieldError};
use crate::models::event::{Event, EventPatch, NewEvent, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};
use crate::models::ids::{parse_uuid, EventId};
use crate::services::event_service;
use crate::utils::datetime::ensure_utc;
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_datetime: String, // ISO 8601 with timezone offset
    pub end_datetime: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title,
            description: event.description,
            start_datetime: event.start_datetime,
            end_datetime: event.end_datetime,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// Field checks mirror the database column constraints. Lengths are counted in
// characters, not bytes.

fn validate_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.trim().is_empty() || title.chars().count() > TITLE_MAX_LEN {
        errors.push(FieldError::new(
            "title",
            "Title must be between 1 and 255 characters",
        ));
    }
}

fn validate_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        errors.push(FieldError::new(
            "description",
            "Description cannot exceed 2000 characters",
        ));
    }
}

fn parse_datetime_field(
    field: &str,
    value: &str,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    match ensure_utc(value) {
        Ok(dt) => Some(dt),
        Err(message) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

impl CreateEventRequest {
    /// Run field validation and UTC normalization, collecting every failure.
    pub fn validate(self) -> Result<NewEvent, EventError> {
        let mut errors = Vec::new();

        validate_title(&self.title, &mut errors);
        if let Some(description) = &self.description {
            validate_description(description, &mut errors);
        }
        let start_datetime = parse_datetime_field("start_datetime", &self.start_datetime, &mut errors);
        let end_datetime = match &self.end_datetime {
            Some(value) => parse_datetime_field("end_datetime", value, &mut errors),
            None => None,
        };

        match (errors.is_empty(), start_datetime) {
            (true, Some(start_datetime)) => Ok(NewEvent {
                title: self.title,
                description: self.description,
                start_datetime,
                end_datetime,
            }),
            _ => Err(EventError::RequestValidation(errors)),
        }
    }
}

impl UpdateEventRequest {
    /// Like create validation, but every field is optional. Absent (or null)
    /// fields are left out of the patch entirely.
    pub fn validate(self) -> Result<EventPatch, EventError> {
        let mut errors = Vec::new();

        if let Some(title) = &self.title {
            validate_title(title, &mut errors);
        }
        if let Some(description) = &self.description {
            validate_description(description, &mut errors);
        }
        let start_datetime = self
            .start_datetime
            .as_deref()
            .and_then(|value| parse_datetime_field("start_datetime", value, &mut errors));
        let end_datetime = self
            .end_datetime
            .as_deref()
            .and_then(|value| parse_datetime_field("end_datetime", value, &mut errors));

        if !errors.is_empty() {
            return Err(EventError::RequestValidation(errors));
        }

        Ok(EventPatch {
            title: self.title,
            description: self.description,
            start_datetime,
            end_datetime,
        })
    }
}

fn parse_event_id(raw: &str) -> Result<EventId, EventError> {
    parse_uuid(raw, "event_id")
        .map_err(|message| EventError::RequestValidation(vec![FieldError::new("event_id", message)]))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), EventError> {
    let input = payload.validate()?;
    let event = event_service::create_event(&state.db_pool, input).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn get_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EventResponse>, EventError> {
    let event_id = parse_event_id(&event_id)?;
    let event = event_service::get_event(&state.db_pool, event_id).await?;
    Ok(Json(event.into()))
}

pub async fn update_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, EventError> {
    let event_id = parse_event_id(&event_id)?;
    let patch = payload.validate()?;
    let event = event_service::update_event(&state.db_pool, event_id, patch).await?;
    Ok(Json(event.into()))
}

pub async fn delete_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, EventError> {
    let event_id = parse_event_id(&event_id)?;
    event_service::delete_event(&state.db_pool, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_events(
    Query(params): Query<ListEventsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, EventError> {
    let mut errors = Vec::new();
    if matches!(params.limit, Some(limit) if limit <= 0) {
        errors.push(FieldError::new("limit", "limit must be greater than 0"));
    }
    if matches!(params.offset, Some(offset) if offset < 0) {
        errors.push(FieldError::new(
            "offset",
            "offset must be greater than or equal to 0",
        ));
    }
    if !errors.is_empty() {
        return Err(EventError::RequestValidation(errors));
    }

    let events = event_service::list_events(
        &state.db_pool,
        &state.config,
        params.limit,
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_request() -> CreateEventRequest {
        CreateEventRequest {
            title: "Team standup".to_string(),
            description: Some("Daily sync".to_string()),
            start_datetime: "2024-05-01T10:00:00+02:00".to_string(),
            end_datetime: Some("2024-05-01T10:30:00+02:00".to_string()),
        }
    }

    fn field_names(err: EventError) -> Vec<String> {
        match err {
            EventError::RequestValidation(errors) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            other => panic!("expected RequestValidation, got {:?}", other),
        }
    }

    #[test]
    fn create_validate_normalizes_timestamps_to_utc() {
        let input = create_request().validate().unwrap();
        assert_eq!(
            input.start_datetime,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(
            input.end_datetime,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn create_validate_accepts_title_at_max_length() {
        let mut request = create_request();
        request.title = "x".repeat(TITLE_MAX_LEN);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_validate_rejects_blank_title() {
        let mut request = create_request();
        request.title = "   ".to_string();
        assert_eq!(field_names(request.validate().unwrap_err()), vec!["title"]);
    }

    #[test]
    fn create_validate_rejects_overlong_title() {
        let mut request = create_request();
        request.title = "x".repeat(TITLE_MAX_LEN + 1);
        assert_eq!(field_names(request.validate().unwrap_err()), vec!["title"]);
    }

    #[test]
    fn create_validate_rejects_overlong_description() {
        let mut request = create_request();
        request.description = Some("x".repeat(DESCRIPTION_MAX_LEN + 1));
        assert_eq!(
            field_names(request.validate().unwrap_err()),
            vec!["description"]
        );
    }

    #[test]
    fn create_validate_rejects_naive_start() {
        let mut request = create_request();
        request.start_datetime = "2024-05-01T10:00:00".to_string();
        assert_eq!(
            field_names(request.validate().unwrap_err()),
            vec!["start_datetime"]
        );
    }

    #[test]
    fn create_validate_collects_every_failure() {
        let request = CreateEventRequest {
            title: "".to_string(),
            description: Some("x".repeat(DESCRIPTION_MAX_LEN + 1)),
            start_datetime: "2024-05-01T10:00:00".to_string(),
            end_datetime: Some("nonsense".to_string()),
        };
        let fields = field_names(request.validate().unwrap_err());
        assert_eq!(
            fields,
            vec!["title", "description", "start_datetime", "end_datetime"]
        );
    }

    #[test]
    fn update_validate_with_no_fields_is_empty_patch() {
        let request = UpdateEventRequest {
            title: None,
            description: None,
            start_datetime: None,
            end_datetime: None,
        };
        assert!(request.validate().unwrap().is_empty());
    }

    #[test]
    fn update_validate_keeps_only_provided_fields() {
        let request = UpdateEventRequest {
            title: Some("New title".to_string()),
            description: None,
            start_datetime: None,
            end_datetime: Some("2024-05-01T12:00:00Z".to_string()),
        };
        let patch = request.validate().unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert!(patch.description.is_none());
        assert!(patch.start_datetime.is_none());
        assert_eq!(
            patch.end_datetime,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn update_validate_rejects_bad_fields() {
        let request = UpdateEventRequest {
            title: Some("".to_string()),
            description: None,
            start_datetime: Some("2024-05-01T10:00:00".to_string()),
            end_datetime: None,
        };
        let fields = field_names(request.validate().unwrap_err());
        assert_eq!(fields, vec!["title", "start_datetime"]);
    }

    #[test]
    fn event_id_parse_rejects_malformed_input() {
        assert!(parse_event_id("not-a-uuid").is_err());
        assert!(parse_event_id("d3f1c8a2-5b48-4a0e-9f3a-1c2b3d4e5f60").is_ok());
    }
}
