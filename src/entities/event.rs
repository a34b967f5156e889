//! Event entity - Represents tracked events and the synthetic Company row.
//!
//! Events carry venue and scheduling metadata plus a lifecycle `status`
//! (`"upcoming"`, `"done"`, or NULL). The row with name and owner both set to
//! `"Company"` is a lazily created singleton that scopes company-wide ledger
//! entries; it must never be duplicated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the event
    pub name: String,
    /// Person or organisation responsible for the event
    pub owner: String,
    /// Free-text description
    pub description: Option<String>,
    /// Venue name
    pub venue_name: Option<String>,
    /// Street address of the venue
    pub address_line1: Option<String>,
    /// City where the event takes place
    pub city: Option<String>,
    /// Country where the event takes place
    pub country: Option<String>,
    /// Calendar date of the event
    pub event_date: Option<Date>,
    /// Time of day the event starts
    pub start_time: Option<Time>,
    /// Time of day the event ends
    pub end_time: Option<Time>,
    /// Last calendar date for multi-day events
    pub end_date: Option<Date>,
    /// IANA timezone name for the event's times
    pub timezone: Option<String>,
    /// Deadline for reservations
    pub reservation_deadline_date: Option<Date>,
    /// Lifecycle status: `"upcoming"`, `"done"`, or NULL (treated as upcoming)
    pub status: Option<String>,
    /// Event web page
    pub url_address: Option<String>,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One event has many ledger entries
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntries,
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
