//! Stock entry entity - Represents raw-material purchases.
//!
//! Stock entries form a company-wide ledger of their own with no relationship
//! to events. The total cost of a purchase is always recomputed as
//! `price_per_kg * weight_kg`, never stored. The measurement unit (kilograms
//! vs discrete pieces) is encoded inside the free-text description with a
//! `[unit:kg]` / `[unit:pcs]` marker; absence of the marker means kilograms.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_entries")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Price per unit in EUR, non-negative
    pub price_per_kg: f64,
    /// Purchased quantity, strictly positive
    pub weight_kg: f64,
    /// Calendar date of the purchase
    pub purchase_date: Date,
    /// Free-text description, may embed a unit marker
    pub description: Option<String>,
    /// Who made the purchase
    pub purchased_by: String,
    /// How the purchase was paid
    pub payment_method: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Stock entries have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
