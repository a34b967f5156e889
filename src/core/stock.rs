//! Stock ledger - raw-material purchase records.
//!
//! Stock purchases are a company-wide append-only ledger independent of
//! events. The total cost of a purchase is always derived as
//! `price_per_kg * weight_kg` at read time.

use crate::{
    core::filter::{DateRange, contains_ci},
    entities::{StockEntry, stock_entry},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields of a stock purchase to be recorded.
#[derive(Debug, Clone, Default)]
pub struct NewStockEntry {
    /// Price per unit in EUR, non-negative (free stock is allowed)
    pub price_per_kg: f64,
    /// Purchased quantity, strictly positive
    pub weight_kg: f64,
    /// Calendar date of the purchase
    pub purchase_date: Option<NaiveDate>,
    /// Free-text description, may embed a `[unit:kg]` / `[unit:pcs]` marker
    pub description: Option<String>,
    /// Who made the purchase
    pub purchased_by: String,
    /// How the purchase was paid
    pub payment_method: String,
}

/// Records a stock purchase and returns the persisted row.
///
/// A zero or negative quantity is meaningless and rejected, as is a negative
/// price; purchase date, purchaser, and payment method are required.
pub async fn append_stock_entry(
    db: &DatabaseConnection,
    entry: NewStockEntry,
) -> Result<stock_entry::Model> {
    if !entry.price_per_kg.is_finite() || entry.price_per_kg < 0.0 {
        return Err(Error::InvalidAmount {
            amount: entry.price_per_kg,
        });
    }
    if !entry.weight_kg.is_finite() || entry.weight_kg <= 0.0 {
        return Err(Error::validation(format!(
            "Stock quantity must be positive, got {}",
            entry.weight_kg
        )));
    }
    let purchase_date = entry
        .purchase_date
        .ok_or_else(|| Error::validation("Purchase date is required"))?;
    if entry.purchased_by.trim().is_empty() {
        return Err(Error::validation("Purchaser is required"));
    }
    if entry.payment_method.trim().is_empty() {
        return Err(Error::validation("Payment method is required"));
    }

    let now = chrono::Utc::now();
    let model = stock_entry::ActiveModel {
        price_per_kg: Set(entry.price_per_kg),
        weight_kg: Set(entry.weight_kg),
        purchase_date: Set(purchase_date),
        description: Set(entry.description),
        purchased_by: Set(entry.purchased_by),
        payment_method: Set(entry.payment_method),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Created stock entry {}: {} x {} EUR",
        created.id, created.weight_kg, created.price_per_kg
    );
    Ok(created)
}

/// Filters for the stock listing.
#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    /// Inclusive purchase-date range
    pub range: DateRange,
    /// Exact purchaser match
    pub purchased_by: Option<String>,
    /// Exact payment method match
    pub payment_method: Option<String>,
    /// Case-insensitive description substring
    pub query: Option<String>,
}

/// Lists stock purchases matching the filter, newest first.
pub async fn list_stock_entries(
    db: &DatabaseConnection,
    filter: &StockFilter,
) -> Result<Vec<stock_entry::Model>> {
    let mut cond = Condition::all();

    if let Some(start) = filter.range.start {
        cond = cond.add(stock_entry::Column::PurchaseDate.gte(start));
    }
    if let Some(end) = filter.range.end {
        cond = cond.add(stock_entry::Column::PurchaseDate.lte(end));
    }
    if let Some(purchased_by) = &filter.purchased_by {
        cond = cond.add(stock_entry::Column::PurchasedBy.eq(purchased_by.clone()));
    }
    if let Some(payment_method) = &filter.payment_method {
        cond = cond.add(stock_entry::Column::PaymentMethod.eq(payment_method.clone()));
    }
    if let Some(query) = &filter.query {
        cond = cond.add(contains_ci(stock_entry::Column::Description, query));
    }

    StockEntry::find()
        .filter(cond)
        .order_by_desc(stock_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Selects stock rows for export: one row when an id is given, all rows
/// otherwise, newest first.
pub async fn list_stock_for_export(
    db: &DatabaseConnection,
    id: Option<i64>,
) -> Result<Vec<stock_entry::Model>> {
    let mut query = StockEntry::find();
    if let Some(id) = id {
        query = query.filter(stock_entry::Column::Id.eq(id));
    }
    query
        .order_by_desc(stock_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{create_test_stock, setup_test_db};

    fn valid_entry() -> NewStockEntry {
        NewStockEntry {
            price_per_kg: 4.0,
            weight_kg: 2.5,
            purchase_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            description: None,
            purchased_by: "Ana".to_string(),
            payment_method: "cash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_stock_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let created = append_stock_entry(&db, valid_entry()).await?;
        assert!(created.id > 0);
        assert_eq!(created.price_per_kg, 4.0);
        assert_eq!(created.weight_kg, 2.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_append_stock_entry_rejects_invalid_values() -> Result<()> {
        let db = setup_test_db().await?;

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                weight_kg: 0.0,
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                weight_kg: -1.0,
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                price_per_kg: -0.5,
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Free stock is allowed
        let free = append_stock_entry(
            &db,
            NewStockEntry {
                price_per_kg: 0.0,
                ..valid_entry()
            },
        )
        .await?;
        assert_eq!(free.price_per_kg, 0.0);

        // Nothing except the free entry was persisted
        let rows = list_stock_entries(&db, &StockFilter::default()).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_append_stock_entry_requires_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                purchase_date: None,
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                purchased_by: String::new(),
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = append_stock_entry(
            &db,
            NewStockEntry {
                payment_method: "  ".to_string(),
                ..valid_entry()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_stock_entries_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();

        append_stock_entry(
            &db,
            NewStockEntry {
                purchase_date: Some(d(5)),
                description: Some("Flour".to_string()),
                ..valid_entry()
            },
        )
        .await?;
        append_stock_entry(
            &db,
            NewStockEntry {
                purchase_date: Some(d(20)),
                purchased_by: "Ivo".to_string(),
                payment_method: "card".to_string(),
                description: Some("Sugar [unit:kg]".to_string()),
                ..valid_entry()
            },
        )
        .await?;

        let by_range = list_stock_entries(
            &db,
            &StockFilter {
                range: DateRange {
                    start: Some(d(10)),
                    end: None,
                },
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_range.len(), 1);
        assert_eq!(by_range[0].purchased_by, "Ivo");

        let by_purchaser = list_stock_entries(
            &db,
            &StockFilter {
                purchased_by: Some("Ana".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_purchaser.len(), 1);

        let by_query = list_stock_entries(
            &db,
            &StockFilter {
                query: Some("sug".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_query.len(), 1);
        assert_eq!(by_query[0].description.as_deref(), Some("Sugar [unit:kg]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_stock_for_export_id_mode() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_stock(&db, 1.0, 1.0, None).await?;
        create_test_stock(&db, 2.0, 2.0, None).await?;

        let all = list_stock_for_export(&db, None).await?;
        assert_eq!(all.len(), 2);
        // Newest first
        assert!(all[0].id > all[1].id);

        let one = list_stock_for_export(&db, Some(first.id)).await?;
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, first.id);

        let none = list_stock_for_export(&db, Some(9999)).await?;
        assert!(none.is_empty());
        Ok(())
    }
}
