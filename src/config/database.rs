//! Database configuration module for the event-ledger service.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. Tables are generated with `SeaORM`'s
//! `Schema::create_table_from_entity` method so that the database schema matches the Rust
//! struct definitions without requiring manual SQL, with one exception: the partial unique
//! index that enforces the Company-placeholder singleton is created with a raw statement,
//! since entity attributes cannot express a filtered composite index.

use crate::entities::{Event, LedgerEntry, StockEntry};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/event_ledger.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Also creates the partial unique index guaranteeing that at most one
/// `(name="Company", owner="Company")` event row can ever exist, which is what
/// makes the lazy placeholder creation safe under concurrent callers.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut event_table = schema.create_table_from_entity(Event);
    let mut ledger_table = schema.create_table_from_entity(LedgerEntry);
    let mut stock_table = schema.create_table_from_entity(StockEntry);

    db.execute(builder.build(event_table.if_not_exists())).await?;
    db.execute(builder.build(ledger_table.if_not_exists())).await?;
    db.execute(builder.build(stock_table.if_not_exists())).await?;

    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_events_company_singleton \
         ON events (name, owner) \
         WHERE name = 'Company' AND owner = 'Company'",
    )
    .await?;

    Ok(())
}
