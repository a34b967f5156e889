//! Query parameter parsing shared by list and export endpoints.
//!
//! Every consumer of user-supplied filters (list endpoints, rollups, export)
//! goes through these helpers so that the same parameter triple always selects
//! the same row set. Raw parameters arrive as strings; an empty string means
//! "no bound" and a malformed value is a validation error, never a silent
//! no-op filter.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};

/// An inclusive date range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range from raw `start`/`end` query parameters.
    pub fn from_params(start: &str, end: &str) -> Result<Self> {
        Ok(DateRange {
            start: parse_date_param(start)?,
            end: parse_date_param(end)?,
        })
    }

    /// True when neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// User-supplied selection for ledger list and export queries.
///
/// When `id` is set it takes precedence: the query returns at most that one
/// row and the range/category filters are ignored, mirroring the export
/// endpoints' single-receipt mode.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    /// Direct row id, overrides all other filters
    pub id: Option<i64>,
    /// Inclusive entry-date range
    pub range: DateRange,
    /// Case-insensitive category substring
    pub category: Option<String>,
}

impl LedgerFilter {
    /// Builds a filter from raw query parameters.
    pub fn from_params(start: &str, end: &str, category: &str, id: &str) -> Result<Self> {
        Ok(LedgerFilter {
            id: parse_id_param(id)?,
            range: DateRange::from_params(start, end)?,
            category: if category.is_empty() {
                None
            } else {
                Some(category.to_string())
            },
        })
    }
}

/// Parses a date-only query parameter. Empty means "no bound".
pub fn parse_date_param(raw: &str) -> Result<Option<NaiveDate>> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid date: {raw}")))
}

/// Parses an `HH:mm` time-of-day parameter. Empty means absent.
pub fn parse_time_param(raw: &str) -> Result<Option<NaiveTime>> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid time: {raw}")))
}

/// Parses a numeric id query parameter. Empty means absent.
pub fn parse_id_param(raw: &str) -> Result<Option<i64>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid id: {raw}")))
}

/// Case-insensitive substring match on a text column
/// (`lower(col) LIKE '%needle%'`).
pub(crate) fn contains_ci<C>(col: C, needle: &str) -> SimpleExpr
where
    C: ColumnTrait,
{
    let pattern = format!("%{}%", needle.to_lowercase());
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}
