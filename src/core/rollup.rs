//! Aggregation engine - rollups and page totals.
//!
//! The scope rollup partitions ledger rows into four non-overlapping buckets
//! (income, plain expense, salary, stock cost) plus a derived net. Each bucket
//! is its own store query so the rule behind every figure stays auditable, and
//! the queries are read-only and commute, so they run concurrently. A row
//! counts toward the salary bucket either through the canonical
//! `entry_type="salary"` or through the legacy
//! `entry_type="expense"`/`category="Salary"` shape; the two signals select
//! disjoint row sets, so nothing is double counted.

use crate::{
    core::filter::DateRange,
    core::ledger::{
        CATEGORY_SALARY, CATEGORY_STOCK, ENTRY_TYPE_EXPENSE, ENTRY_TYPE_INCOME, ENTRY_TYPE_SALARY,
        SumScope, UNCATEGORIZED_LABEL, sum_amount,
    },
    entities::{ledger_entry, stock_entry},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Income, expense, salary, and stock totals for one scope, plus net.
/// The default value is the all-zero rollup of an empty selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerRollup {
    /// Total income
    pub income: f64,
    /// Total plain expenses (salary and stock-cost rows excluded)
    pub expense: f64,
    /// Total salaries, both canonical and legacy representations
    pub salary: f64,
    /// Total stock costs booked through the ledger
    pub stock: f64,
    /// `income - expense - salary - stock`
    pub net: f64,
}

async fn ledger_rollup(
    db: &DatabaseConnection,
    event_id: Option<i64>,
    range: DateRange,
) -> Result<LedgerRollup> {
    let not_salary_stock = [CATEGORY_SALARY, CATEGORY_STOCK];
    let only_salary = [CATEGORY_SALARY];
    let only_stock = [CATEGORY_STOCK];

    let income_scope = SumScope {
        event_id,
        range,
        ..Default::default()
    };
    let expense_scope = SumScope {
        event_id,
        range,
        category_not_in: Some(&not_salary_stock),
        ..Default::default()
    };
    let salary_scope = SumScope {
        event_id,
        range,
        ..Default::default()
    };
    let salary_legacy_scope = SumScope {
        event_id,
        range,
        category_in: Some(&only_salary),
        ..Default::default()
    };
    let stock_scope = SumScope {
        event_id,
        range,
        category_in: Some(&only_stock),
        ..Default::default()
    };

    let (income, expense, salary_typed, salary_legacy, stock) = tokio::try_join!(
        sum_amount(db, ENTRY_TYPE_INCOME, &income_scope),
        sum_amount(db, ENTRY_TYPE_EXPENSE, &expense_scope),
        sum_amount(db, ENTRY_TYPE_SALARY, &salary_scope),
        sum_amount(db, ENTRY_TYPE_EXPENSE, &salary_legacy_scope),
        sum_amount(db, ENTRY_TYPE_EXPENSE, &stock_scope),
    )?;

    let salary = salary_typed + salary_legacy;
    Ok(LedgerRollup {
        income,
        expense,
        salary,
        stock,
        net: income - expense - salary - stock,
    })
}

/// Computes the rollup for a single event, used by the done-events view.
pub async fn event_rollup(
    db: &DatabaseConnection,
    event_id: i64,
    range: DateRange,
) -> Result<LedgerRollup> {
    ledger_rollup(db, Some(event_id), range).await
}

/// Computes the company-wide rollup across all events, the Company
/// placeholder included.
pub async fn company_rollup(db: &DatabaseConnection, range: DateRange) -> Result<LedgerRollup> {
    ledger_rollup(db, None, range).await
}

/// Totals over an already-selected set of ledger rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerTotals {
    /// Sum of all amounts in the selection
    pub total: f64,
    /// Per-category sums, in first-seen order
    pub by_category: Vec<(String, f64)>,
}

/// Reduces a filtered row set to its total and per-category breakdown.
///
/// Categories appear in the order they are first seen in the row slice;
/// entries without a category fall under the `"(uncategorized)"` sentinel.
#[must_use]
pub fn ledger_totals(rows: &[ledger_entry::Model]) -> LedgerTotals {
    let mut total = 0.0;
    let mut by_category: Vec<(String, f64)> = Vec::new();

    for row in rows {
        total += row.amount;
        let label = row
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL);
        match by_category.iter_mut().find(|(key, _)| key == label) {
            Some((_, sum)) => *sum += row.amount,
            None => by_category.push((label.to_string(), row.amount)),
        }
    }

    LedgerTotals { total, by_category }
}

/// Totals over an already-selected set of stock rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockTotals {
    /// Sum of purchased quantities
    pub total_weight: f64,
    /// Sum of per-row `price * weight` costs
    pub total_cost: f64,
}

/// Reduces a stock row set to its quantity and cost totals.
///
/// The cost is computed per row and then summed; since the price varies per
/// row, summing prices and weights separately would give a different (wrong)
/// figure.
#[must_use]
pub fn stock_totals(rows: &[stock_entry::Model]) -> StockTotals {
    let mut total_weight = 0.0;
    let mut total_cost = 0.0;
    for row in rows {
        total_weight += row.weight_kg;
        total_cost += row.price_per_kg * row.weight_kg;
    }
    StockTotals {
        total_weight,
        total_cost,
    }
}
