use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse};
use crate::orders::{self, ItemQuantity, PlacedOrder};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Menu item to order
    pub menu_item_id: i32,
    /// Number of units, must be positive
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Ordering customer
    pub customer_id: i32,
    /// Restaurant the order is placed against
    pub restaurant_id: i32,
    /// Line items; a missing, non-list, or empty value is rejected
    #[serde(default)]
    #[schema(value_type = Option<Vec<OrderItemRequest>>)]
    pub items: Option<serde_json::Value>,
}

/// `items` is taken as raw JSON so that an absent field or a non-list
/// value reports `InvalidInput` instead of a deserialization rejection.
fn parse_items(items: Option<serde_json::Value>) -> Result<Vec<ItemQuantity>, ApiError> {
    let entries = match items {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ApiError::InvalidInput(
                "Invalid or empty order items array".to_string(),
            ))
        }
    };

    entries
        .into_iter()
        .map(|entry| {
            let item: OrderItemRequest = serde_json::from_value(entry)
                .map_err(|e| ApiError::InvalidInput(format!("Invalid order item: {e}")))?;
            Ok(ItemQuantity {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
            })
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    /// New order status, e.g. "delivered"
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub customer_id: i32,
    pub restaurant_id: i32,
    /// Total price as a decimal string, priced at creation time
    pub total_price: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub order_items: Vec<OrderItemResponse>,
}

impl From<PlacedOrder> for OrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        OrderResponse {
            id: placed.order.id,
            customer_id: placed.order.customer_id,
            restaurant_id: placed.order.restaurant_id,
            total_price: placed.order.total_price.to_string(),
            status: placed.order.status,
            created_at: placed.order.created_at,
            order_items: placed
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    menu_item_id: item.menu_item_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 404, description = "Customer, restaurant, or menu item not found or unavailable", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let items = parse_items(payload.items)?;

    let conn = &mut state.store.conn()?;
    let placed = orders::place_order(conn, payload.customer_id, payload.restaurant_id, &items)?;

    Ok((StatusCode::CREATED, Json(placed.into())))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order details with its items", body = OrderResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    let placed = orders::load_order(conn, order_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(placed.into()))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    orders::set_status(conn, order_id, &payload.status)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Order not found".to_string()))?;

    let placed = orders::load_order(conn, order_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(placed.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_items_accepts_list() {
        let items = parse_items(Some(json!([
            { "menuItemId": 3, "quantity": 2 },
            { "menuItemId": 5, "quantity": 1 },
        ])))
        .unwrap();
        assert_eq!(
            items,
            vec![
                ItemQuantity {
                    menu_item_id: 3,
                    quantity: 2,
                },
                ItemQuantity {
                    menu_item_id: 5,
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_parse_items_rejects_non_list() {
        let result = parse_items(Some(json!("pasta")));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        let result = parse_items(Some(json!({ "menuItemId": 3, "quantity": 2 })));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_items_rejects_malformed_entry() {
        let result = parse_items(Some(json!([{ "menuItemId": 3 }])));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_items_missing_field_is_empty() {
        assert!(parse_items(None).unwrap().is_empty());
        assert!(parse_items(Some(serde_json::Value::Null))
            .unwrap()
            .is_empty());
    }
}
