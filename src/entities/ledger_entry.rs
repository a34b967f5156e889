//! Ledger entry entity - Represents all financial entries in the system.
//!
//! Each entry belongs to an event (or to the synthetic Company event for
//! company-wide bookkeeping) and carries an `entry_type` of `"income"`,
//! `"expense"`, or `"salary"`. The category literals `"Salary"` and `"Stock"`
//! under an expense entry carry aggregation meaning beyond display.
//! Entries are append-only: created, listed, and deleted, never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the event this entry belongs to
    pub event_id: i64,
    /// Entry kind: `"income"`, `"expense"`, or `"salary"`
    pub entry_type: String,
    /// Free-text sub-classification; `"Salary"` and `"Stock"` are significant
    pub category: Option<String>,
    /// Human-readable description of the entry
    pub description: Option<String>,
    /// Monetary amount, always non-negative
    pub amount: f64,
    /// ISO currency code, defaults to `"EUR"`
    pub currency: String,
    /// Accounting date of the entry
    pub entry_date: Date,
    /// How the amount was paid
    pub payment_method: Option<String>,
    /// Other party of the entry (e.g. the employee for a salary)
    pub counterparty: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between LedgerEntry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
