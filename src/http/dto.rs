//! Response shapes for the HTTP surface.
//!
//! Store models never serialize directly: 64-bit identifiers encode as
//! decimal strings in every JSON response to avoid precision loss in
//! JavaScript consumers, and derived fields (event names, stock total cost)
//! are attached here.

use crate::{
    core::rollup::{LedgerRollup, LedgerTotals, StockTotals},
    entities::{event, ledger_entry, stock_entry},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// An event row as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct EventDto {
    /// Identifier as a decimal string
    pub id: String,
    /// Event name
    pub name: String,
    /// Event owner
    pub owner: String,
    /// Free-text description
    pub description: Option<String>,
    /// Venue name
    pub venue_name: Option<String>,
    /// Street address
    pub address_line1: Option<String>,
    /// City
    pub city: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Calendar date of the event
    pub event_date: Option<NaiveDate>,
    /// Start time of day
    pub start_time: Option<NaiveTime>,
    /// End time of day
    pub end_time: Option<NaiveTime>,
    /// Last calendar date for multi-day events
    pub end_date: Option<NaiveDate>,
    /// Timezone name
    pub timezone: Option<String>,
    /// Reservation deadline
    pub reservation_deadline_date: Option<NaiveDate>,
    /// Lifecycle status
    pub status: Option<String>,
    /// Event web page
    pub url_address: Option<String>,
}

impl From<event::Model> for EventDto {
    fn from(model: event::Model) -> Self {
        EventDto {
            id: model.id.to_string(),
            name: model.name,
            owner: model.owner,
            description: model.description,
            venue_name: model.venue_name,
            address_line1: model.address_line1,
            city: model.city,
            country: model.country,
            event_date: model.event_date,
            start_time: model.start_time,
            end_time: model.end_time,
            end_date: model.end_date,
            timezone: model.timezone,
            reservation_deadline_date: model.reservation_deadline_date,
            status: model.status,
            url_address: model.url_address,
        }
    }
}

/// A ledger entry row as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryDto {
    /// Identifier as a decimal string
    pub id: String,
    /// Owning event id as a decimal string
    pub event_id: String,
    /// Name of the owning event, when resolvable
    pub event_name: Option<String>,
    /// `"income"`, `"expense"`, or `"salary"`
    pub entry_type: String,
    /// Free-text category
    pub category: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Monetary amount
    pub amount: f64,
    /// ISO currency code
    pub currency: String,
    /// Accounting date
    pub entry_date: NaiveDate,
    /// Payment method
    pub payment_method: Option<String>,
    /// Other party of the entry
    pub counterparty: Option<String>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Row update timestamp
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntryDto {
    /// Builds the response row, attaching the owning event's name when the
    /// hydration map resolves it.
    #[must_use]
    pub fn from_model(model: ledger_entry::Model, event_names: &HashMap<i64, String>) -> Self {
        LedgerEntryDto {
            id: model.id.to_string(),
            event_id: model.event_id.to_string(),
            event_name: event_names.get(&model.event_id).cloned(),
            entry_type: model.entry_type,
            category: model.category,
            description: model.description,
            amount: model.amount,
            currency: model.currency,
            entry_date: model.entry_date,
            payment_method: model.payment_method,
            counterparty: model.counterparty,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ledger_entry::Model> for LedgerEntryDto {
    fn from(model: ledger_entry::Model) -> Self {
        LedgerEntryDto::from_model(model, &HashMap::new())
    }
}

/// A stock purchase row as returned to clients, with the derived total cost.
#[derive(Debug, Clone, Serialize)]
pub struct StockEntryDto {
    /// Identifier as a decimal string
    pub id: String,
    /// Price per unit in EUR
    pub price_per_kg: f64,
    /// Purchased quantity
    pub weight_kg: f64,
    /// Derived `price_per_kg * weight_kg`, never stored
    pub total_cost: f64,
    /// Purchase date
    pub purchase_date: NaiveDate,
    /// Free-text description, unit marker included as stored
    pub description: Option<String>,
    /// Who made the purchase
    pub purchased_by: String,
    /// Payment method
    pub payment_method: String,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Row update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<stock_entry::Model> for StockEntryDto {
    fn from(model: stock_entry::Model) -> Self {
        StockEntryDto {
            id: model.id.to_string(),
            total_cost: model.price_per_kg * model.weight_kg,
            price_per_kg: model.price_per_kg,
            weight_kg: model.weight_kg,
            purchase_date: model.purchase_date,
            description: model.description,
            purchased_by: model.purchased_by,
            payment_method: model.payment_method,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One category's share of a filtered ledger selection.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotalDto {
    /// Category label, `"(uncategorized)"` for entries without one
    pub category: String,
    /// Summed amount
    pub amount: f64,
}

/// A filtered ledger listing with its totals.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerListDto {
    /// Matching rows, newest first
    pub entries: Vec<LedgerEntryDto>,
    /// Sum over the selection
    pub total: f64,
    /// Per-category sums in first-seen order
    pub by_category: Vec<CategoryTotalDto>,
}

impl LedgerListDto {
    /// Assembles the listing response from rows, totals, and the event-name
    /// hydration map.
    #[must_use]
    pub fn new(
        entries: Vec<ledger_entry::Model>,
        totals: LedgerTotals,
        event_names: &HashMap<i64, String>,
    ) -> Self {
        LedgerListDto {
            entries: entries
                .into_iter()
                .map(|e| LedgerEntryDto::from_model(e, event_names))
                .collect(),
            total: totals.total,
            by_category: totals
                .by_category
                .into_iter()
                .map(|(category, amount)| CategoryTotalDto { category, amount })
                .collect(),
        }
    }
}

/// A filtered stock listing with its totals.
#[derive(Debug, Clone, Serialize)]
pub struct StockListDto {
    /// Matching rows, newest first
    pub entries: Vec<StockEntryDto>,
    /// Sum of purchased quantities
    pub total_weight: f64,
    /// Sum of per-row costs
    pub total_cost: f64,
}

impl StockListDto {
    /// Assembles the listing response from rows and their totals.
    #[must_use]
    pub fn new(entries: Vec<stock_entry::Model>, totals: StockTotals) -> Self {
        StockListDto {
            entries: entries.into_iter().map(StockEntryDto::from).collect(),
            total_weight: totals.total_weight,
            total_cost: totals.total_cost,
        }
    }
}

/// A done event together with its financial rollup.
#[derive(Debug, Clone, Serialize)]
pub struct DoneEventDto {
    /// The event row
    pub event: EventDto,
    /// Income/expense/salary/stock/net over the requested range
    pub rollup: LedgerRollup,
}
