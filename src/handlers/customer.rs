use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use diesel::{insert_into, prelude::*, result::DatabaseErrorKind};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse};
use crate::handlers::order::OrderResponse;
use crate::orders;
use crate::{models, schema};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer))
        .route("/customers/{id}", get(get_customer))
        .route("/customers/{id}/orders", get(list_customer_orders))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    /// Customer's display name
    pub name: String,
    /// Contact email, unique per customer
    pub email: String,
    /// Contact phone number
    pub phone_number: String,
    /// Delivery address
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl From<models::Customer> for CustomerResponse {
    fn from(c: models::Customer) -> Self {
        CustomerResponse {
            id: c.id,
            name: c.name,
            email: c.email,
            phone_number: c.phone_number,
            address: c.address,
        }
    }
}

#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer created successfully", body = CustomerResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "customers"
)]
#[instrument(skip(state))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    let customer = insert_into(schema::customers::table)
        .values(&models::NewCustomer {
            name: payload.name,
            email: payload.email,
            phone_number: payload.phone_number,
            address: payload.address,
        })
        .returning(models::Customer::as_returning())
        .get_result(conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ApiError::InvalidInput(info.message().to_string())
            }
            e => ApiError::Internal(e.to_string()),
        })?;

    Ok(Json(customer.into()))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    responses(
        (status = 200, description = "Customer details", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Customer ID")
    ),
    tag = "customers"
)]
#[instrument(skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    let customer = schema::customers::table
        .find(customer_id)
        .select(models::Customer::as_select())
        .first(conn)
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer.into()))
}

#[utoipa::path(
    get,
    path = "/customers/{id}/orders",
    responses(
        (status = 200, description = "Orders placed by the customer", body = Vec<OrderResponse>),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Customer ID")
    ),
    tag = "customers"
)]
#[instrument(skip(state))]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let conn = &mut state.store.conn()?;

    let orders = orders::list_customer_orders(conn, customer_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
