//! Invoice endpoints (read only; invoices are written by status changes)

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use shared::error::AppError;
use shared::models::{Invoice, InvoiceDocument};

use crate::orders::invoice::document;
use crate::orders::pdf;
use crate::state::AppState;

use super::{ApiResult, Json, RestaurantFilter, restaurants};

/// GET /invoices?restaurant_id=
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Invoice>> {
    Ok(Json(state.orders.list_invoices(filter.restaurant_id).await?))
}

/// GET /invoices/{id}
pub async fn get_invoice(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Invoice> {
    Ok(Json(state.orders.get_invoice(id).await?))
}

async fn load_document(state: &AppState, id: i64) -> Result<InvoiceDocument, AppError> {
    let invoice = state.orders.get_invoice(id).await?;
    let order = state.orders.get_order(invoice.order_id).await?;
    let restaurant = restaurants::load(state, invoice.restaurant_id).await?;
    Ok(document(invoice, &order, &restaurant))
}

/// GET /invoices/{id}/document
pub async fn get_invoice_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<InvoiceDocument> {
    Ok(Json(load_document(&state, id).await?))
}

/// GET /invoices/{id}/pdf
pub async fn download_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_document(&state, id).await?;
    let bytes = pdf::render(&doc)?;
    tracing::info!(invoice_id = id, size = bytes.len(), "Invoice PDF rendered");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=invoice-{id}.pdf"),
            ),
        ],
        bytes,
    ))
}
