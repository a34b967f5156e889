//! Event directory endpoints.

use super::{ApiResult, AppJson, AppState, dto::DoneEventDto, dto::EventDto};
use crate::{
    core::event::{NewEvent, UpcomingFilter},
    core::filter::{DateRange, parse_date_param, parse_id_param, parse_time_param},
    core::{event as event_ops, rollup},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::warn;

pub(crate) fn require_id(raw: &str) -> Result<i64> {
    parse_id_param(raw)?.ok_or_else(|| Error::validation("Missing id"))
}

/// Body of `POST /events`. Date fields arrive as `YYYY-MM-DD` strings and
/// time fields as `HH:mm`; empty strings mean absent.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Event name, required
    pub name: String,
    /// Event owner, required
    pub owner: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Venue name
    #[serde(default)]
    pub venue_name: Option<String>,
    /// Street address
    #[serde(default)]
    pub address_line1: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// Event date, `YYYY-MM-DD`
    #[serde(default)]
    pub event_date: Option<String>,
    /// Start time, `HH:mm`
    #[serde(default)]
    pub start_time: Option<String>,
    /// End time, `HH:mm`
    #[serde(default)]
    pub end_time: Option<String>,
    /// End date for multi-day events, `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<String>,
    /// Timezone name
    #[serde(default)]
    pub timezone: Option<String>,
    /// Reservation deadline, `YYYY-MM-DD`
    #[serde(default)]
    pub reservation_deadline_date: Option<String>,
    /// `"upcoming"` or `"done"`
    #[serde(default)]
    pub status: Option<String>,
    /// Event web page
    #[serde(default)]
    pub url_address: Option<String>,
}

impl CreateEventRequest {
    fn into_new_event(self) -> Result<NewEvent> {
        Ok(NewEvent {
            name: self.name,
            owner: self.owner,
            description: self.description,
            venue_name: self.venue_name,
            address_line1: self.address_line1,
            city: self.city,
            country: self.country,
            event_date: parse_date_param(self.event_date.as_deref().unwrap_or_default())?,
            start_time: parse_time_param(self.start_time.as_deref().unwrap_or_default())?,
            end_time: parse_time_param(self.end_time.as_deref().unwrap_or_default())?,
            end_date: parse_date_param(self.end_date.as_deref().unwrap_or_default())?,
            timezone: self.timezone,
            reservation_deadline_date: parse_date_param(
                self.reservation_deadline_date.as_deref().unwrap_or_default(),
            )?,
            status: self.status.filter(|s| !s.is_empty()),
            url_address: self.url_address,
        })
    }
}

/// `POST /events` - creates an event, 201 with the created row.
pub async fn create_event_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventDto>)> {
    let created = event_ops::create_event(&state.db, body.into_new_event()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetStatusRequest {
    #[serde(default)]
    status: Option<String>,
}

/// `PATCH /events/{id}` - updates the status field only.
pub async fn set_status_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<SetStatusRequest>,
) -> ApiResult<Json<EventDto>> {
    let id = require_id(&id)?;
    let status = body
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation("Missing id or status"))?;
    let updated = event_ops::set_event_status(&state.db, id, &status).await?;
    Ok(Json(updated.into()))
}

/// `DELETE /events/{id}` - hard delete, blocked while ledger rows reference
/// the event.
pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventDto>> {
    let id = require_id(&id)?;
    let deleted = event_ops::delete_event(&state.db, id).await?;
    Ok(Json(deleted.into()))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct UpcomingQuery {
    #[serde(default)]
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    date: String,
}

/// `GET /events` - upcoming events (status `"upcoming"` or NULL) with
/// name/city substring and calendar-day filters.
pub async fn list_upcoming_handler(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<EventDto>>> {
    let filter = UpcomingFilter {
        name: Some(query.name).filter(|s| !s.is_empty()),
        city: Some(query.city).filter(|s| !s.is_empty()),
        date: parse_date_param(&query.date)?,
    };
    let events = event_ops::list_upcoming_events(&state.db, &filter).await?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct DoneQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

/// `GET /events/done` - done events, each with its financial rollup over the
/// requested range.
pub async fn list_done_handler(
    State(state): State<AppState>,
    Query(query): Query<DoneQuery>,
) -> ApiResult<Json<Vec<DoneEventDto>>> {
    let range = DateRange::from_params(&query.start, &query.end)?;
    let events = event_ops::list_done_events(&state.db, &range).await?;

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        // One broken aggregate degrades to zeros instead of blanking the
        // whole report
        let rollup = match rollup::event_rollup(&state.db, event.id, range).await {
            Ok(rollup) => rollup,
            Err(err) => {
                warn!("Rollup failed for event {}: {err}", event.id);
                crate::core::rollup::LedgerRollup::default()
            }
        };
        out.push(DoneEventDto {
            event: event.into(),
            rollup,
        });
    }
    Ok(Json(out))
}
