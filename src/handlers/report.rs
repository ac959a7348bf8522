use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse};
use crate::reports;

use super::customer::CustomerResponse;
use super::restaurant::MenuItemResponse;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers/top", get(top_customers))
        .route("/menu/top-items", get(top_menu_items))
        .route("/restaurants/{id}/revenue", get(restaurant_revenue))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomerResponse {
    pub customer: CustomerResponse,
    /// Number of orders this customer has placed
    pub order_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopMenuItemResponse {
    pub menu_item: MenuItemResponse,
    /// Total quantity sold across all orders
    pub total_quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    /// Summed order totals as a decimal string, "0" when no orders exist
    pub revenue: String,
}

#[utoipa::path(
    get,
    path = "/customers/top",
    responses(
        (status = 200, description = "Up to five customers ranked by order count", body = Vec<TopCustomerResponse>),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn top_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopCustomerResponse>>, ApiError> {
    let conn = &mut state.store.conn()?;

    let top = reports::top_customers(conn).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(
        top.into_iter()
            .map(|(customer, order_count)| TopCustomerResponse {
                customer: customer.into(),
                order_count,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/menu/top-items",
    responses(
        (status = 200, description = "Best-selling menu item by quantity; empty when no orders exist", body = Vec<TopMenuItemResponse>),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn top_menu_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopMenuItemResponse>>, ApiError> {
    let conn = &mut state.store.conn()?;

    let top = reports::top_menu_item(conn).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(
        top.into_iter()
            .map(|(menu_item, total_quantity)| TopMenuItemResponse {
                menu_item: menu_item.into(),
                total_quantity,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}/revenue",
    responses(
        (status = 200, description = "Summed revenue for the restaurant", body = RevenueResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn restaurant_revenue(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    let revenue = reports::restaurant_revenue(conn, restaurant_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RevenueResponse {
        revenue: revenue.to_string(),
    }))
}
