//! Ledger entry store - append, list, delete, and sum operations.
//!
//! All financial entries live in one append-only table partitioned by
//! `entry_type` and `category`. This module owns the single general-purpose
//! selection query used by both list endpoints and export, which is what keeps
//! their row sets identical for the same filters. The salary entry kind is
//! stored canonically as `entry_type="salary"`; rows written by older data as
//! `entry_type="expense"` with category `"Salary"` remain valid read inputs
//! and are folded into the salary bucket by the aggregation engine.

use crate::{
    core::filter::{DateRange, LedgerFilter, contains_ci},
    entities::{Event, LedgerEntry, ledger_entry},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Entry kind for money coming in.
pub const ENTRY_TYPE_INCOME: &str = "income";
/// Entry kind for money going out.
pub const ENTRY_TYPE_EXPENSE: &str = "expense";
/// Entry kind for salary payments.
pub const ENTRY_TYPE_SALARY: &str = "salary";

/// Category literal marking legacy salary rows stored as expenses.
pub const CATEGORY_SALARY: &str = "Salary";
/// Category literal marking stock-cost rows stored as expenses.
pub const CATEGORY_STOCK: &str = "Stock";

/// Label used for entries without a category in by-category totals.
pub const UNCATEGORIZED_LABEL: &str = "(uncategorized)";

/// Default currency applied when the caller does not supply one.
pub const DEFAULT_CURRENCY: &str = "EUR";

fn is_valid_entry_type(entry_type: &str) -> bool {
    matches!(
        entry_type,
        ENTRY_TYPE_INCOME | ENTRY_TYPE_EXPENSE | ENTRY_TYPE_SALARY
    )
}

/// Fields of a ledger entry to be appended.
#[derive(Debug, Clone, Default)]
pub struct NewLedgerEntry {
    /// `"income"`, `"expense"`, or `"salary"`
    pub entry_type: String,
    /// Free-text sub-classification
    pub category: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Monetary amount, must be finite and non-negative
    pub amount: f64,
    /// ISO currency code, defaults to `"EUR"`
    pub currency: Option<String>,
    /// Accounting date, defaults to today
    pub entry_date: Option<NaiveDate>,
    /// How the amount was paid
    pub payment_method: Option<String>,
    /// Other party of the entry
    pub counterparty: Option<String>,
}

/// Appends a ledger entry scoped to an event and returns the persisted row.
///
/// The amount is validated before any store call: negative, NaN, and infinite
/// values are rejected and nothing is written. The entry date falls back to
/// today and the currency to EUR when unspecified.
pub async fn append_entry(
    db: &DatabaseConnection,
    event_id: i64,
    entry: NewLedgerEntry,
) -> Result<ledger_entry::Model> {
    if !entry.amount.is_finite() || entry.amount < 0.0 {
        return Err(Error::InvalidAmount {
            amount: entry.amount,
        });
    }
    if !is_valid_entry_type(&entry.entry_type) {
        return Err(Error::validation(format!(
            "Unknown entry type: {}",
            entry.entry_type
        )));
    }

    Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "event",
            id: event_id,
        })?;

    let now = chrono::Utc::now();
    let model = ledger_entry::ActiveModel {
        event_id: Set(event_id),
        entry_type: Set(entry.entry_type),
        category: Set(entry.category),
        description: Set(entry.description),
        amount: Set(entry.amount),
        currency: Set(entry
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
        entry_date: Set(entry.entry_date.unwrap_or_else(|| now.date_naive())),
        payment_method: Set(entry.payment_method),
        counterparty: Set(entry.counterparty),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Created ledger entry {} for event {}: type='{}', amount={}",
        created.id, created.event_id, created.entry_type, created.amount
    );
    Ok(created)
}

/// Retrieves all ledger entries for one event, newest entry date first.
/// Store-assigned ids break ties so that the most recently appended row of a
/// day sorts first.
pub async fn list_entries_for_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Vec<ledger_entry::Model>> {
    LedgerEntry::find()
        .filter(ledger_entry::Column::EventId.eq(event_id))
        .order_by_desc(ledger_entry::Column::EntryDate)
        .order_by_desc(ledger_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The single general-purpose selection used by list endpoints and export.
///
/// A direct id filter takes precedence and ignores the range and category
/// filters. Category matching is a case-insensitive substring; date bounds
/// are inclusive on both ends and open-ended when one side is missing.
pub async fn list_entries(
    db: &DatabaseConnection,
    entry_type: &str,
    filter: &LedgerFilter,
) -> Result<Vec<ledger_entry::Model>> {
    let mut cond = Condition::all().add(ledger_entry::Column::EntryType.eq(entry_type));

    if let Some(id) = filter.id {
        cond = cond.add(ledger_entry::Column::Id.eq(id));
    } else {
        if let Some(start) = filter.range.start {
            cond = cond.add(ledger_entry::Column::EntryDate.gte(start));
        }
        if let Some(end) = filter.range.end {
            cond = cond.add(ledger_entry::Column::EntryDate.lte(end));
        }
        if let Some(category) = &filter.category {
            cond = cond.add(contains_ci(ledger_entry::Column::Category, category));
        }
    }

    LedgerEntry::find()
        .filter(cond)
        .order_by_desc(ledger_entry::Column::EntryDate)
        .order_by_desc(ledger_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a ledger entry by id, returning the deleted row.
pub async fn delete_entry(db: &DatabaseConnection, id: i64) -> Result<ledger_entry::Model> {
    let entry = LedgerEntry::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "ledger entry",
            id,
        })?;

    entry.clone().delete(db).await?;
    info!("Deleted ledger entry {}", id);
    Ok(entry)
}

/// Scope of a [`sum_amount`] aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumScope<'a> {
    /// Restrict to one event; `None` means company-wide (all events)
    pub event_id: Option<i64>,
    /// Only count rows whose category is one of these literals
    pub category_in: Option<&'a [&'a str]>,
    /// Exclude rows whose category is one of these literals; NULL categories pass
    pub category_not_in: Option<&'a [&'a str]>,
    /// Inclusive entry-date range
    pub range: DateRange,
}

/// Sums entry amounts for one entry type within a scope.
/// An empty selection yields 0.0, never null.
pub async fn sum_amount(
    db: &DatabaseConnection,
    entry_type: &str,
    scope: &SumScope<'_>,
) -> Result<f64> {
    let mut cond = Condition::all().add(ledger_entry::Column::EntryType.eq(entry_type));

    if let Some(event_id) = scope.event_id {
        cond = cond.add(ledger_entry::Column::EventId.eq(event_id));
    }
    if let Some(categories) = scope.category_in {
        cond = cond.add(ledger_entry::Column::Category.is_in(categories.iter().copied()));
    }
    if let Some(categories) = scope.category_not_in {
        cond = cond.add(
            Condition::any()
                .add(ledger_entry::Column::Category.is_null())
                .add(ledger_entry::Column::Category.is_not_in(categories.iter().copied())),
        );
    }
    if let Some(start) = scope.range.start {
        cond = cond.add(ledger_entry::Column::EntryDate.gte(start));
    }
    if let Some(end) = scope.range.end {
        cond = cond.add(ledger_entry::Column::EntryDate.lte(end));
    }

    let total: Option<Option<f64>> = LedgerEntry::find()
        .select_only()
        .column_as(ledger_entry::Column::Amount.sum(), "total")
        .filter(cond)
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}

/// Resolves event names for a set of ledger entries in one query.
///
/// Used to hydrate the Event column of list and export rows after the
/// selection query has run, so both consumers share the exact same selection.
pub async fn event_names_for(
    db: &DatabaseConnection,
    entries: &[ledger_entry::Model],
) -> Result<HashMap<i64, String>> {
    let mut ids: Vec<i64> = entries.iter().map(|e| e.event_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let events = Event::find()
        .filter(crate::entities::event::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(events.into_iter().map(|e| (e.id, e.name)).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{append_test_entry, create_test_event, setup_test_db};

    #[tokio::test]
    async fn test_append_entry_rejects_negative_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        let result = append_entry(
            &db,
            event.id,
            NewLedgerEntry {
                entry_type: ENTRY_TYPE_EXPENSE.to_string(),
                amount: -5.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount } if amount == -5.0
        ));

        // Nothing was persisted
        let rows = list_entries_for_event(&db, event.id).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_entry_rejects_non_finite_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = append_entry(
                &db,
                event.id,
                NewLedgerEntry {
                    entry_type: ENTRY_TYPE_INCOME.to_string(),
                    amount: bad,
                    ..Default::default()
                },
            )
            .await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidAmount { amount: _ }
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_append_entry_rejects_unknown_type_and_event() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        let result = append_entry(
            &db,
            event.id,
            NewLedgerEntry {
                entry_type: "transfer".to_string(),
                amount: 1.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = append_entry(
            &db,
            9999,
            NewLedgerEntry {
                entry_type: ENTRY_TYPE_INCOME.to_string(),
                amount: 1.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "event", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_append_entry_applies_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        let created = append_entry(
            &db,
            event.id,
            NewLedgerEntry {
                entry_type: ENTRY_TYPE_INCOME.to_string(),
                amount: 10.0,
                ..Default::default()
            },
        )
        .await?;

        assert!(created.id > 0);
        assert_eq!(created.currency, DEFAULT_CURRENCY);
        assert_eq!(created.entry_date, chrono::Utc::now().date_naive());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_entries_for_event_orders_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();

        append_test_entry(&db, event.id, ENTRY_TYPE_INCOME, 1.0, None, Some(d(10))).await?;
        append_test_entry(&db, event.id, ENTRY_TYPE_INCOME, 2.0, None, Some(d(20))).await?;
        append_test_entry(&db, event.id, ENTRY_TYPE_INCOME, 3.0, None, Some(d(20))).await?;

        let rows = list_entries_for_event(&db, event.id).await?;
        let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
        // Same-day rows tie-break on id, newest insert first
        assert_eq!(amounts, vec![3.0, 2.0, 1.0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_entries_date_bounds_are_inclusive() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;
        let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();

        for day in [9u32, 10, 15, 20, 21] {
            append_test_entry(
                &db,
                event.id,
                ENTRY_TYPE_EXPENSE,
                f64::from(day),
                None,
                Some(d(day)),
            )
            .await?;
        }

        let filter = LedgerFilter {
            range: DateRange {
                start: Some(d(10)),
                end: Some(d(20)),
            },
            ..Default::default()
        };
        let rows = list_entries(&db, ENTRY_TYPE_EXPENSE, &filter).await?;
        let mut amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
        amounts.sort_by(f64::total_cmp);
        assert_eq!(amounts, vec![10.0, 15.0, 20.0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_entries_category_substring_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 1.0, Some("Food"), None).await?;
        append_test_entry(
            &db,
            event.id,
            ENTRY_TYPE_EXPENSE,
            2.0,
            Some("Seafood platter"),
            None,
        )
        .await?;
        append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 3.0, Some("Travel"), None).await?;

        let filter = LedgerFilter {
            category: Some("FOOD".to_string()),
            ..Default::default()
        };
        let rows = list_entries(&db, ENTRY_TYPE_EXPENSE, &filter).await?;
        assert_eq!(rows.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_entries_id_takes_precedence() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let kept =
            append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 1.0, Some("Food"), Some(d))
                .await?;
        append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 2.0, Some("Food"), Some(d)).await?;

        // A range that excludes the row and a mismatched category are both
        // ignored when an id is given
        let filter = LedgerFilter {
            id: Some(kept.id),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2030, 1, 1),
                end: None,
            },
            category: Some("Travel".to_string()),
        };
        let rows = list_entries(&db, ENTRY_TYPE_EXPENSE, &filter).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, kept.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;
        let entry =
            append_test_entry(&db, event.id, ENTRY_TYPE_INCOME, 10.0, None, None).await?;

        let deleted = delete_entry(&db, entry.id).await?;
        assert_eq!(deleted.id, entry.id);
        assert!(list_entries_for_event(&db, event.id).await?.is_empty());

        let result = delete_entry(&db, entry.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "ledger entry",
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_sum_amount_empty_selection_is_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let total = sum_amount(&db, ENTRY_TYPE_INCOME, &SumScope::default()).await?;
        assert_eq!(total, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sum_amount_category_not_in_keeps_null_categories() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Fair").await?;

        append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 5.0, None, None).await?;
        append_test_entry(
            &db,
            event.id,
            ENTRY_TYPE_EXPENSE,
            7.0,
            Some(CATEGORY_SALARY),
            None,
        )
        .await?;
        append_test_entry(
            &db,
            event.id,
            ENTRY_TYPE_EXPENSE,
            11.0,
            Some(CATEGORY_STOCK),
            None,
        )
        .await?;
        append_test_entry(&db, event.id, ENTRY_TYPE_EXPENSE, 2.0, Some("Food"), None).await?;

        let plain = sum_amount(
            &db,
            ENTRY_TYPE_EXPENSE,
            &SumScope {
                event_id: Some(event.id),
                category_not_in: Some(&[CATEGORY_SALARY, CATEGORY_STOCK]),
                ..Default::default()
            },
        )
        .await?;
        // Uncategorized + Food, salary and stock excluded
        assert_eq!(plain, 7.0);
        Ok(())
    }
}
