//! API endpoint handlers
//!
//! The boundary's job is range validation and translation: query strings
//! become `TradeQuery` values, loose JSON bodies go through the record
//! normalizer, and core errors map onto status codes. Write endpoints
//! exist only for the relational store; the snapshot is read-only.

use crate::error::{AppError, ErrorResponse};
use crate::model::{Page, SortKey, SortOrder, Trade, TradePatch, TradeQuery, DEFAULT_LIMIT, MAX_LIMIT};
use crate::normalize::normalize_record;
use crate::store::{SnapshotStore, SqliteDb, TradeSource};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Shared state for API handlers
pub struct ApiState {
    pub snapshot: Arc<SnapshotStore>,
    pub db: Arc<SqliteDb>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidNumericFormat(_) => StatusCode::BAD_REQUEST,
            AppError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// Listing options as they arrive on the query string
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub trade_code: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    /// Validate boundary ranges and normalize into a core query
    fn into_query(self) -> Result<TradeQuery, AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(TradeQuery {
            trade_code: self.trade_code,
            date_from: self.date_from,
            date_to: self.date_to,
            sort: SortKey::parse(self.sort.as_deref().unwrap_or_default()),
            order: SortOrder::parse(self.order.as_deref().unwrap_or_default()),
            limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// Health check endpoint - GET /healthz or GET /
pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List snapshot trades - GET /api/data
pub async fn list_snapshot(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, AppError> {
    let query = params.into_query()?;
    Ok(Json(state.snapshot.list(&query)?))
}

/// Distinct snapshot instrument codes - GET /api/data/trade-codes
pub async fn snapshot_trade_codes(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.snapshot.trade_codes()?))
}

/// List persisted trades - GET /api/trades
pub async fn list_trades(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, AppError> {
    let query = params.into_query()?;
    Ok(Json(state.db.list(&query)?))
}

/// Distinct persisted instrument codes - GET /api/trade-codes
pub async fn trade_codes(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.db.trade_codes()?))
}

/// Create a trade - POST /api/trades
///
/// The body is a loose object, normalized exactly like a bulk-import row;
/// a row a file import would accept is accepted here too. Any caller
/// supplied id is ignored.
pub async fn create_trade(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    let trade = normalize_record(&payload)?;
    let stored = state.db.create(&trade)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Partially update a trade - PATCH /api/trades/{id}
pub async fn update_trade(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(patch): Json<TradePatch>,
) -> Result<Json<Trade>, AppError> {
    Ok(Json(state.db.update(id, &patch)?))
}

/// Delete a trade - DELETE /api/trades/{id}
pub async fn delete_trade(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.db.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
