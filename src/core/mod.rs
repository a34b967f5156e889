//! Core business logic - framework-agnostic operations over the store.
//!
//! Everything in here takes a `DatabaseConnection` (or plain row slices) and
//! returns structured data; the HTTP layer is only responsible for decoding
//! requests into these calls and encoding the results.

/// Event directory - creation, lifecycle, listing, and the Company placeholder
pub mod event;
/// Export encoding - CSV and HTML table rendering with the canonical column sets
pub mod export;
/// Query parameter parsing shared by list and export endpoints
pub mod filter;
/// Ledger entry store - append, list, delete, and sum operations
pub mod ledger;
/// Aggregation engine - rollups and page totals
pub mod rollup;
/// Stock ledger - raw-material purchase records
pub mod stock;
