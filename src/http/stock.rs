//! Stock endpoints - purchases and export.

use super::{ApiResult, AppJson, AppState, dto::StockEntryDto, dto::StockListDto};
use crate::{
    core::export::{
        self, ExportFormat, STOCK_EXPORT_HEADER, encode_csv, encode_excel_html, encode_word_html,
    },
    core::filter::{DateRange, parse_date_param, parse_id_param},
    core::rollup,
    core::stock::{self as stock_ops, NewStockEntry, StockFilter},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
};
use serde::Deserialize;

/// Body of `POST /stock`.
#[derive(Debug, Deserialize)]
pub struct StockEntryRequest {
    /// Price per unit in EUR
    pub price_per_kg: f64,
    /// Purchased quantity
    pub weight_kg: f64,
    /// Purchase date, `YYYY-MM-DD`, required
    #[serde(default)]
    pub purchase_date: Option<String>,
    /// Free-text description, may embed a unit marker
    #[serde(default)]
    pub description: Option<String>,
    /// Who made the purchase
    #[serde(default)]
    pub purchased_by: Option<String>,
    /// Payment method
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl StockEntryRequest {
    fn into_new_entry(self) -> Result<NewStockEntry> {
        Ok(NewStockEntry {
            price_per_kg: self.price_per_kg,
            weight_kg: self.weight_kg,
            purchase_date: parse_date_param(self.purchase_date.as_deref().unwrap_or_default())?,
            description: self.description,
            purchased_by: self.purchased_by.unwrap_or_default(),
            payment_method: self.payment_method.unwrap_or_default(),
        })
    }
}

/// `POST /stock` - records a purchase, 201 with the created row, 400 when
/// price/weight are out of range or a required field is missing.
pub async fn create_stock_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<StockEntryRequest>,
) -> ApiResult<(StatusCode, Json<StockEntryDto>)> {
    let created = stock_ops::append_stock_entry(&state.db, body.into_new_entry()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct StockListQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    purchased_by: String,
    #[serde(default)]
    payment_method: String,
    #[serde(default)]
    q: String,
}

/// `GET /stock` - filtered purchases with quantity and cost totals.
pub async fn list_stock_handler(
    State(state): State<AppState>,
    Query(query): Query<StockListQuery>,
) -> ApiResult<Json<StockListDto>> {
    let filter = StockFilter {
        range: DateRange::from_params(&query.start, &query.end)?,
        purchased_by: Some(query.purchased_by).filter(|s| !s.is_empty()),
        payment_method: Some(query.payment_method).filter(|s| !s.is_empty()),
        query: Some(query.q).filter(|s| !s.is_empty()),
    };
    let entries = stock_ops::list_stock_entries(&state.db, &filter).await?;
    let totals = rollup::stock_totals(&entries);
    Ok(Json(StockListDto::new(entries, totals)))
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct StockExportQuery {
    #[serde(default)]
    id: String,
    #[serde(default)]
    format: String,
}

/// `GET /stock/export` - streams purchases in the stock column set, with the
/// unit-aware precision rules applied.
pub async fn export_stock_handler(
    State(state): State<AppState>,
    Query(query): Query<StockExportQuery>,
) -> ApiResult<([(header::HeaderName, String); 2], String)> {
    let id = parse_id_param(&query.id)?;
    let entries = stock_ops::list_stock_for_export(&state.db, id).await?;
    let cells = export::stock_export_cells(&entries);

    let format = ExportFormat::parse(&query.format);
    let filename = export::stock_export_filename(id, format);
    let title = filename.trim_end_matches(&format!(".{}", format.extension())).to_string();

    let payload = match format {
        ExportFormat::Csv => encode_csv(&STOCK_EXPORT_HEADER, &cells)?,
        ExportFormat::Excel => encode_excel_html(&title, &STOCK_EXPORT_HEADER, &cells),
        ExportFormat::Word => {
            encode_word_html(&title, "Stock export", "", &STOCK_EXPORT_HEADER, &cells)
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
