//! Event directory - creation, lifecycle, listing, and the Company placeholder.
//!
//! Events move from `"upcoming"` (or NULL, treated the same) to `"done"`.
//! The synthetic `(name="Company", owner="Company")` row scopes company-wide
//! ledger entries and is created lazily on first use; a partial unique index
//! created in `config::database` guarantees it stays a singleton even when two
//! requests race through the lookup-then-create path.

use crate::{
    core::filter::{DateRange, contains_ci},
    entities::{Event, LedgerEntry, event, ledger_entry},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// Status of an event that has not happened yet.
pub const STATUS_UPCOMING: &str = "upcoming";
/// Status of a completed event.
pub const STATUS_DONE: &str = "done";
/// Name and owner of the synthetic company-wide placeholder event.
pub const COMPANY_NAME: &str = "Company";

/// Fields of an event to be created.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    /// Human-readable name, required
    pub name: String,
    /// Person or organisation responsible, required
    pub owner: String,
    /// Free-text description
    pub description: Option<String>,
    /// Venue name
    pub venue_name: Option<String>,
    /// Street address of the venue
    pub address_line1: Option<String>,
    /// City
    pub city: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Calendar date of the event
    pub event_date: Option<NaiveDate>,
    /// Time of day the event starts
    pub start_time: Option<NaiveTime>,
    /// Time of day the event ends
    pub end_time: Option<NaiveTime>,
    /// Last calendar date for multi-day events
    pub end_date: Option<NaiveDate>,
    /// IANA timezone name
    pub timezone: Option<String>,
    /// Reservation deadline
    pub reservation_deadline_date: Option<NaiveDate>,
    /// `"upcoming"`, `"done"`, or absent
    pub status: Option<String>,
    /// Event web page
    pub url_address: Option<String>,
}

fn validate_status(status: &str) -> Result<()> {
    if status == STATUS_UPCOMING || status == STATUS_DONE {
        Ok(())
    } else {
        Err(Error::validation(format!("Unknown status: {status}")))
    }
}

/// Creates a new event, performing input validation.
pub async fn create_event(db: &DatabaseConnection, new: NewEvent) -> Result<event::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::validation("Event name cannot be empty"));
    }
    if new.owner.trim().is_empty() {
        return Err(Error::validation("Event owner cannot be empty"));
    }
    if let Some(status) = &new.status {
        validate_status(status)?;
    }

    let model = event::ActiveModel {
        name: Set(new.name.trim().to_string()),
        owner: Set(new.owner.trim().to_string()),
        description: Set(new.description),
        venue_name: Set(new.venue_name),
        address_line1: Set(new.address_line1),
        city: Set(new.city),
        country: Set(new.country),
        event_date: Set(new.event_date),
        start_time: Set(new.start_time),
        end_time: Set(new.end_time),
        end_date: Set(new.end_date),
        timezone: Set(new.timezone),
        reservation_deadline_date: Set(new.reservation_deadline_date),
        status: Set(new.status),
        url_address: Set(new.url_address),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!("Created event {} ('{}')", created.id, created.name);
    Ok(created)
}

async fn find_company_event(db: &DatabaseConnection) -> Result<Option<event::Model>> {
    Event::find()
        .filter(event::Column::Name.eq(COMPANY_NAME))
        .filter(event::Column::Owner.eq(COMPANY_NAME))
        .order_by_asc(event::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up the singleton Company placeholder event, creating it with
/// status `"done"` on first use.
///
/// Two concurrent callers can both observe "absent" and both attempt the
/// insert; the partial unique index makes the second insert fail, in which
/// case the loser re-reads the winner's row. The function is therefore
/// idempotent under concurrent calls.
pub async fn get_or_create_company_event(db: &DatabaseConnection) -> Result<event::Model> {
    if let Some(found) = find_company_event(db).await? {
        return Ok(found);
    }

    let model = event::ActiveModel {
        name: Set(COMPANY_NAME.to_string()),
        owner: Set(COMPANY_NAME.to_string()),
        status: Set(Some(STATUS_DONE.to_string())),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(created) => {
            info!("Created Company placeholder event {}", created.id);
            Ok(created)
        }
        // Lost the creation race: the winner's row must exist now
        Err(err) => match find_company_event(db).await? {
            Some(found) => Ok(found),
            None => Err(err.into()),
        },
    }
}

/// Updates the status field of an event, leaving everything else untouched.
pub async fn set_event_status(
    db: &DatabaseConnection,
    id: i64,
    status: &str,
) -> Result<event::Model> {
    validate_status(status)?;

    let found = Event::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "event", id })?;

    let mut model: event::ActiveModel = found.into();
    model.status = Set(Some(status.to_string()));
    let updated = model.update(db).await?;
    info!("Event {} status set to '{}'", updated.id, status);
    Ok(updated)
}

/// Hard-deletes an event, returning the deleted row.
///
/// Deletion is blocked while ledger entries still reference the event, so
/// financial rows can never be silently orphaned.
pub async fn delete_event(db: &DatabaseConnection, id: i64) -> Result<event::Model> {
    let found = Event::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "event", id })?;

    let referencing = LedgerEntry::find()
        .filter(ledger_entry::Column::EventId.eq(id))
        .count(db)
        .await?;
    if referencing > 0 {
        return Err(Error::validation(format!(
            "Event {id} still has {referencing} ledger entries; delete them first"
        )));
    }

    found.clone().delete(db).await?;
    info!("Deleted event {}", id);
    Ok(found)
}

/// Filters for the upcoming-events listing.
#[derive(Debug, Clone, Default)]
pub struct UpcomingFilter {
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Case-insensitive city substring
    pub city: Option<String>,
    /// Exact calendar day of the event
    pub date: Option<NaiveDate>,
}

/// Lists events that have not been marked done (status `"upcoming"` or NULL),
/// newest first.
pub async fn list_upcoming_events(
    db: &DatabaseConnection,
    filter: &UpcomingFilter,
) -> Result<Vec<event::Model>> {
    let mut cond = Condition::all().add(
        Condition::any()
            .add(event::Column::Status.eq(STATUS_UPCOMING))
            .add(event::Column::Status.is_null()),
    );
    if let Some(name) = &filter.name {
        cond = cond.add(contains_ci(event::Column::Name, name));
    }
    if let Some(city) = &filter.city {
        cond = cond.add(contains_ci(event::Column::City, city));
    }
    if let Some(date) = filter.date {
        cond = cond.add(event::Column::EventDate.eq(date));
    }

    Event::find()
        .filter(cond)
        .order_by_desc(event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists done events, newest first.
///
/// When a date range is supplied, an event is included if its
/// `[event_date .. end_date-or-event_date]` interval overlaps the requested
/// interval inclusively. Events without an event date drop out of any
/// range-filtered listing.
pub async fn list_done_events(
    db: &DatabaseConnection,
    range: &DateRange,
) -> Result<Vec<event::Model>> {
    let mut cond = Condition::all().add(event::Column::Status.eq(STATUS_DONE));

    if let Some(end) = range.end {
        cond = cond.add(event::Column::EventDate.lte(end));
    }
    if let Some(start) = range.start {
        cond = cond.add(
            Condition::any()
                .add(event::Column::EndDate.gte(start))
                .add(
                    Condition::all()
                        .add(event::Column::EndDate.is_null())
                        .add(event::Column::EventDate.gte(start)),
                ),
        );
    }

    Event::find()
        .filter(cond)
        .order_by_desc(event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::{ENTRY_TYPE_EXPENSE, NewLedgerEntry, append_entry};
    use crate::test_utils::{create_done_event, create_test_event, setup_test_db};

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_event(
            &db,
            NewEvent {
                name: "  ".to_string(),
                owner: "Ana".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_event(
            &db,
            NewEvent {
                name: "Fair".to_string(),
                owner: "Ana".to_string(),
                status: Some("cancelled".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_company_placeholder_is_created_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_company_event(&db).await?;
        assert_eq!(first.name, COMPANY_NAME);
        assert_eq!(first.owner, COMPANY_NAME);
        assert_eq!(first.status.as_deref(), Some(STATUS_DONE));

        for _ in 0..3 {
            let again = get_or_create_company_event(&db).await?;
            assert_eq!(again.id, first.id);
        }

        let count = Event::find()
            .filter(event::Column::Name.eq(COMPANY_NAME))
            .filter(event::Column::Owner.eq(COMPANY_NAME))
            .count(&db)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_company_placeholder_concurrent_callers() -> Result<()> {
        let db = setup_test_db().await?;

        let (a, b, c) = tokio::try_join!(
            get_or_create_company_event(&db),
            get_or_create_company_event(&db),
            get_or_create_company_event(&db),
        )?;
        assert_eq!(a.id, b.id);
        assert_eq!(b.id, c.id);

        let count = Event::find()
            .filter(event::Column::Name.eq(COMPANY_NAME))
            .count(&db)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_event_status() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_event(&db, "Fair").await?;
        assert_eq!(created.status, None);

        let updated = set_event_status(&db, created.id, STATUS_DONE).await?;
        assert_eq!(updated.status.as_deref(), Some(STATUS_DONE));

        let result = set_event_status(&db, 9999, STATUS_DONE).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        let result = set_event_status(&db, created.id, "archived").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_blocked_while_referenced() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_event(&db, "Fair").await?;

        let entry = append_entry(
            &db,
            created.id,
            NewLedgerEntry {
                entry_type: ENTRY_TYPE_EXPENSE.to_string(),
                amount: 5.0,
                ..Default::default()
            },
        )
        .await?;

        let result = delete_event(&db, created.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        crate::core::ledger::delete_entry(&db, entry.id).await?;
        let deleted = delete_event(&db, created.id).await?;
        assert_eq!(deleted.id, created.id);

        let result = delete_event(&db, created.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_upcoming_events_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        create_event(
            &db,
            NewEvent {
                name: "Spring Fair".to_string(),
                owner: "Ana".to_string(),
                city: Some("Sofia".to_string()),
                event_date: Some(date),
                status: Some(STATUS_UPCOMING.to_string()),
                ..Default::default()
            },
        )
        .await?;
        create_event(
            &db,
            NewEvent {
                name: "Autumn Gala".to_string(),
                owner: "Ivo".to_string(),
                city: Some("Plovdiv".to_string()),
                ..Default::default()
            },
        )
        .await?;
        create_done_event(&db, "Old Expo", Some(date), None).await?;

        // Status upcoming or NULL, done excluded
        let all = list_upcoming_events(&db, &UpcomingFilter::default()).await?;
        assert_eq!(all.len(), 2);

        let by_name = list_upcoming_events(
            &db,
            &UpcomingFilter {
                name: Some("fair".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Spring Fair");

        let by_city = list_upcoming_events(
            &db,
            &UpcomingFilter {
                city: Some("PLOV".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_city.len(), 1);

        let by_date = list_upcoming_events(
            &db,
            &UpcomingFilter {
                date: Some(date),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].name, "Spring Fair");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_done_events_range_overlap() -> Result<()> {
        let db = setup_test_db().await?;
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();

        // Single-day event inside the range
        create_done_event(&db, "Inside", Some(d(5, 10)), None).await?;
        // Multi-day event straddling the range start
        create_done_event(&db, "Straddles", Some(d(4, 28)), Some(d(5, 2))).await?;
        // Entirely before
        create_done_event(&db, "Before", Some(d(3, 1)), Some(d(3, 2))).await?;
        // Entirely after
        create_done_event(&db, "After", Some(d(6, 1)), None).await?;

        let range = DateRange {
            start: Some(d(5, 1)),
            end: Some(d(5, 31)),
        };
        let rows = list_done_events(&db, &range).await?;
        let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"Inside"));
        assert!(names.contains(&"Straddles"));
        assert_eq!(rows.len(), 2);

        // Unbounded range returns every done event
        let all = list_done_events(&db, &DateRange::default()).await?;
        assert_eq!(all.len(), 4);
        Ok(())
    }
}
