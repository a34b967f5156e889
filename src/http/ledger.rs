//! Ledger endpoints - per-event entries, company expenses/salaries, export.
//!
//! The list and export endpoints run the exact same selection query for the
//! same parameter triple, so displayed totals and exported rows always agree.

use super::{
    ApiResult, AppJson, AppState, dto::LedgerEntryDto, dto::LedgerListDto, events::require_id,
};
use crate::{
    core::event as event_ops,
    core::export::{
        self, ExportFormat, LEDGER_EXPORT_HEADER, encode_csv, encode_excel_html, encode_word_html,
    },
    core::filter::{LedgerFilter, parse_date_param},
    core::ledger::{
        self as ledger_ops, CATEGORY_SALARY, ENTRY_TYPE_EXPENSE, ENTRY_TYPE_INCOME,
        ENTRY_TYPE_SALARY, NewLedgerEntry,
    },
    core::rollup::{self, LedgerRollup},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
};
use serde::Deserialize;

/// Body of the ledger append endpoints.
#[derive(Debug, Deserialize)]
pub struct LedgerEntryRequest {
    /// `"income"`, `"expense"`, or `"salary"` - fixed by the company-scoped
    /// endpoints
    #[serde(default)]
    pub entry_type: Option<String>,
    /// Free-text category
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Monetary amount
    pub amount: f64,
    /// ISO currency code, defaults to EUR
    #[serde(default)]
    pub currency: Option<String>,
    /// Accounting date, `YYYY-MM-DD`, defaults to today
    #[serde(default)]
    pub entry_date: Option<String>,
    /// Payment method
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Other party of the entry
    #[serde(default)]
    pub counterparty: Option<String>,
    /// Employee name for salary entries; lands in `counterparty`
    #[serde(default)]
    pub employee: Option<String>,
}

impl LedgerEntryRequest {
    fn into_new_entry(self, entry_type: Option<&str>) -> Result<NewLedgerEntry> {
        Ok(NewLedgerEntry {
            entry_type: entry_type
                .map(String::from)
                .or(self.entry_type)
                .unwrap_or_default(),
            category: self.category,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            entry_date: parse_date_param(self.entry_date.as_deref().unwrap_or_default())?,
            payment_method: self.payment_method,
            counterparty: self.counterparty.or(self.employee),
        })
    }
}

/// `GET /events/{id}/ledger` - ledger rows for one event, newest entry date
/// first.
pub async fn list_event_ledger_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<LedgerEntryDto>>> {
    let id = require_id(&id)?;
    let entries = ledger_ops::list_entries_for_event(&state.db, id).await?;
    Ok(Json(entries.into_iter().map(LedgerEntryDto::from).collect()))
}

/// `POST /events/{id}/ledger` - appends an entry scoped to an event,
/// 201 with the created row, 400 on invalid amount.
pub async fn append_event_ledger_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<LedgerEntryRequest>,
) -> ApiResult<(StatusCode, Json<LedgerEntryDto>)> {
    let id = require_id(&id)?;
    let created = ledger_ops::append_entry(&state.db, id, body.into_new_entry(None)?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `DELETE /ledger/{id}` - deletes an entry by id, 200 with the deleted row.
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LedgerEntryDto>> {
    let id = require_id(&id)?;
    let deleted = ledger_ops::delete_entry(&state.db, id).await?;
    Ok(Json(deleted.into()))
}

/// `POST /expenses` - appends a company-scoped expense, lazily resolving the
/// Company placeholder event.
pub async fn create_company_expense_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LedgerEntryRequest>,
) -> ApiResult<(StatusCode, Json<LedgerEntryDto>)> {
    let company = event_ops::get_or_create_company_event(&state.db).await?;
    let created = ledger_ops::append_entry(
        &state.db,
        company.id,
        body.into_new_entry(Some(ENTRY_TYPE_EXPENSE))?,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `POST /salaries` - appends a company-scoped salary entry. Salaries are
/// stored canonically as `entry_type="salary"`; the category defaults to
/// `"Salary"` so legacy by-category reports keep working.
pub async fn create_company_salary_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LedgerEntryRequest>,
) -> ApiResult<(StatusCode, Json<LedgerEntryDto>)> {
    let company = event_ops::get_or_create_company_event(&state.db).await?;
    let mut entry = body.into_new_entry(Some(ENTRY_TYPE_SALARY))?;
    if entry.category.is_none() {
        entry.category = Some(CATEGORY_SALARY.to_string());
    }
    let created = ledger_ops::append_entry(&state.db, company.id, entry).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LedgerListQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    category: String,
}

async fn list_ledger(
    state: &AppState,
    entry_type: &str,
    query: &LedgerListQuery,
) -> Result<LedgerListDto> {
    let filter = LedgerFilter::from_params(&query.start, &query.end, &query.category, "")?;
    let entries = ledger_ops::list_entries(&state.db, entry_type, &filter).await?;
    let totals = rollup::ledger_totals(&entries);
    let event_names = ledger_ops::event_names_for(&state.db, &entries).await?;
    Ok(LedgerListDto::new(entries, totals, &event_names))
}

/// `GET /expenses` - filtered expense rows with total and per-category sums.
pub async fn list_expenses_handler(
    State(state): State<AppState>,
    Query(query): Query<LedgerListQuery>,
) -> ApiResult<Json<LedgerListDto>> {
    Ok(Json(list_ledger(&state, ENTRY_TYPE_EXPENSE, &query).await?))
}

/// `GET /income` - filtered income rows with total and per-category sums.
pub async fn list_income_handler(
    State(state): State<AppState>,
    Query(query): Query<LedgerListQuery>,
) -> ApiResult<Json<LedgerListDto>> {
    Ok(Json(list_ledger(&state, ENTRY_TYPE_INCOME, &query).await?))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct SummaryQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

/// `GET /summary` - the company-wide rollup across all events, the Company
/// placeholder included.
pub async fn company_summary_handler(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<LedgerRollup>> {
    let range = crate::core::filter::DateRange::from_params(&query.start, &query.end)?;
    Ok(Json(rollup::company_rollup(&state.db, range).await?))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ExportQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    format: String,
}

/// `GET /expenses/export` - streams the filtered expense rows as CSV, an
/// Excel-flavored HTML table, or a Word-flavored HTML document. The selection
/// is the same `list_entries` call the expense listing runs.
pub async fn export_expenses_handler(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<([(header::HeaderName, String); 2], String)> {
    let filter =
        LedgerFilter::from_params(&query.start, &query.end, &query.category, &query.id)?;
    let entries = ledger_ops::list_entries(&state.db, ENTRY_TYPE_EXPENSE, &filter).await?;
    let event_names = ledger_ops::event_names_for(&state.db, &entries).await?;
    let cells = export::ledger_export_cells(&entries, &event_names);

    let format = ExportFormat::parse(&query.format);
    let filename = export::export_filename("expenses", &query.start, &query.end, format);
    let title = filename.trim_end_matches(&format!(".{}", format.extension())).to_string();

    let payload = match format {
        ExportFormat::Csv => encode_csv(&LEDGER_EXPORT_HEADER, &cells)?,
        ExportFormat::Excel => encode_excel_html(&title, &LEDGER_EXPORT_HEADER, &cells),
        ExportFormat::Word => {
            let period = |raw: &str| if raw.is_empty() { "—".to_string() } else { raw.to_string() };
            let mut intro = format!(
                "Period: {} to {}",
                period(&query.start),
                period(&query.end)
            );
            if !query.category.is_empty() {
                intro.push_str(&format!(", Category: {}", query.category));
            }
            encode_word_html(&title, "Expenses report", &intro, &LEDGER_EXPORT_HEADER, &cells)
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        payload,
    ))
}
