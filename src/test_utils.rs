//! Shared test utilities for the event-ledger service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config,
    core::{event, ledger, stock},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, DatabaseConnection};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests. The pool is pinned
/// to a single connection: a pooled `sqlite::memory:` would otherwise hand
/// each connection its own empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = sea_orm::Database::connect(options).await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test event with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Event name
///
/// # Defaults
/// * `owner`: "Test Owner"
/// * `status`: None (treated as upcoming)
/// * everything else absent
pub async fn create_test_event(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::event::Model> {
    event::create_event(
        db,
        event::NewEvent {
            name: name.to_string(),
            owner: "Test Owner".to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates a done event with the given date interval, for rollup and
/// range-overlap tests.
pub async fn create_done_event(
    db: &DatabaseConnection,
    name: &str,
    event_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<entities::event::Model> {
    event::create_event(
        db,
        event::NewEvent {
            name: name.to_string(),
            owner: "Test Owner".to_string(),
            event_date,
            end_date,
            status: Some(event::STATUS_DONE.to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Appends a ledger entry with custom type, amount, category, and date.
/// The entry date defaults to today when not given.
pub async fn append_test_entry(
    db: &DatabaseConnection,
    event_id: i64,
    entry_type: &str,
    amount: f64,
    category: Option<&str>,
    entry_date: Option<NaiveDate>,
) -> Result<entities::ledger_entry::Model> {
    ledger::append_entry(
        db,
        event_id,
        ledger::NewLedgerEntry {
            entry_type: entry_type.to_string(),
            category: category.map(String::from),
            amount,
            entry_date,
            ..Default::default()
        },
    )
    .await
}

/// Creates a stock purchase with sensible defaults.
///
/// # Defaults
/// * `purchase_date`: 2025-01-01
/// * `purchased_by`: "Test Buyer"
/// * `payment_method`: "cash"
pub async fn create_test_stock(
    db: &DatabaseConnection,
    price_per_kg: f64,
    weight_kg: f64,
    description: Option<&str>,
) -> Result<entities::stock_entry::Model> {
    stock::append_stock_entry(
        db,
        stock::NewStockEntry {
            price_per_kg,
            weight_kg,
            purchase_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            description: description.map(String::from),
            purchased_by: "Test Buyer".to_string(),
            payment_method: "cash".to_string(),
        },
    )
    .await
}
