use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use bigdecimal::BigDecimal;
use diesel::{insert_into, prelude::*, update};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse};
use crate::{models, schema};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", post(create_restaurant))
        .route(
            "/restaurants/{id}/menu",
            get(list_menu).post(create_menu_item),
        )
        .route("/menu/{id}", patch(update_menu_item))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    /// Name of the restaurant
    pub name: String,
    /// Location of the restaurant
    pub location: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
}

impl From<models::Restaurant> for RestaurantResponse {
    fn from(r: models::Restaurant) -> Self {
        RestaurantResponse {
            id: r.id,
            name: r.name,
            location: r.location,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
    /// Name of the menu item
    pub name: String,
    /// Price as a decimal string, e.g. "10.00"
    pub price: String,
    /// Whether the item can be ordered
    pub is_available: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    /// New price as a decimal string, if changing
    pub price: Option<String>,
    /// New availability, if changing
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    pub id: i32,
    pub restaurant_id: i32,
    pub name: String,
    /// Price as a decimal string
    pub price: String,
    pub is_available: bool,
}

impl From<models::MenuItem> for MenuItemResponse {
    fn from(item: models::MenuItem) -> Self {
        MenuItemResponse {
            id: item.id,
            restaurant_id: item.restaurant_id,
            name: item.name,
            price: item.price.to_string(),
            is_available: item.is_available,
        }
    }
}

#[utoipa::path(
    post,
    path = "/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created successfully", body = RestaurantResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<Json<RestaurantResponse>, ApiError> {
    let conn = &mut state.store.conn()?;

    let restaurant = insert_into(schema::restaurants::table)
        .values(&models::NewRestaurant {
            name: payload.name,
            location: payload.location,
        })
        .returning(models::Restaurant::as_returning())
        .get_result(conn)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(restaurant.into()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}/menu",
    responses(
        (status = 200, description = "Available menu items", body = Vec<MenuItemResponse>),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<Vec<MenuItemResponse>>, ApiError> {
    let conn = &mut state.store.conn()?;

    // Only currently orderable items are listed.
    let menu_items = schema::menu_items::table
        .filter(schema::menu_items::restaurant_id.eq(restaurant_id))
        .filter(schema::menu_items::is_available.eq(true))
        .select(models::MenuItem::as_select())
        .load(conn)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(menu_items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item created successfully", body = MenuItemResponse),
        (status = 400, description = "Invalid price", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let price = payload
        .price
        .parse::<BigDecimal>()
        .map_err(|_| ApiError::InvalidInput("Invalid price".to_string()))?;

    let conn = &mut state.store.conn()?;

    schema::restaurants::table
        .find(restaurant_id)
        .select(models::Restaurant::as_select())
        .first(conn)
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Restaurant not found".to_string()))?;

    let menu_item = insert_into(schema::menu_items::table)
        .values(&models::NewMenuItem {
            restaurant_id,
            name: payload.name,
            price,
            is_available: payload.is_available,
        })
        .returning(models::MenuItem::as_returning())
        .get_result(conn)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(menu_item.into()))
}

#[utoipa::path(
    patch,
    path = "/menu/{id}",
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated successfully", body = MenuItemResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Menu item ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(menu_item_id): Path<i32>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    if payload.price.is_none() && payload.is_available.is_none() {
        return Err(ApiError::InvalidInput("No fields to update".to_string()));
    }

    let price = payload
        .price
        .map(|p| p.parse::<BigDecimal>())
        .transpose()
        .map_err(|_| ApiError::InvalidInput("Invalid price".to_string()))?;
    let changes = models::MenuItemChangeset {
        price,
        is_available: payload.is_available,
    };

    let conn = &mut state.store.conn()?;

    let menu_item = update(schema::menu_items::table.find(menu_item_id))
        .set(&changes)
        .returning(models::MenuItem::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound("Menu item not found".to_string()))?;

    Ok(Json(menu_item.into()))
}
