use bigdecimal::BigDecimal;
use diesel::{insert_into, prelude::*, update};
use thiserror::Error;

use crate::error::ApiError;
use crate::{models, schema};

pub const DEFAULT_ORDER_STATUS: &str = "pending";

#[derive(Debug, PartialEq)]
pub struct ItemQuantity {
    pub menu_item_id: i32,
    pub quantity: i32,
}

#[derive(Debug, PartialEq)]
pub struct PlacedOrder {
    pub order: models::Order,
    pub items: Vec<models::OrderItem>,
}

#[derive(Error, Debug)]
pub enum PlaceOrderError {
    #[error("Invalid or empty order items array")]
    EmptyItems,
    #[error("Quantity for menu item with ID {0} must be positive")]
    NonPositiveQuantity(i32),
    #[error("Customer not found")]
    CustomerNotFound,
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Menu item with ID {0} not found")]
    MenuItemNotFound(i32),
    #[error("Menu item with ID {0} is unavailable")]
    MenuItemUnavailable(i32),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

impl From<PlaceOrderError> for ApiError {
    fn from(e: PlaceOrderError) -> Self {
        match e {
            PlaceOrderError::EmptyItems | PlaceOrderError::NonPositiveQuantity(_) => {
                ApiError::InvalidInput(e.to_string())
            }
            PlaceOrderError::CustomerNotFound
            | PlaceOrderError::RestaurantNotFound
            | PlaceOrderError::MenuItemNotFound(_) => ApiError::NotFound(e.to_string()),
            PlaceOrderError::MenuItemUnavailable(_) => ApiError::Unavailable(e.to_string()),
            PlaceOrderError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

pub fn validate_items(items: &[ItemQuantity]) -> Result<(), PlaceOrderError> {
    if items.is_empty() {
        return Err(PlaceOrderError::EmptyItems);
    }
    if let Some(item) = items.iter().find(|i| i.quantity <= 0) {
        return Err(PlaceOrderError::NonPositiveQuantity(item.menu_item_id));
    }
    Ok(())
}

/// Validates referential existence and availability, prices the order
/// from the current menu item snapshot, and persists the order together
/// with its items. The validation reads and both inserts share one
/// transaction, so a partially written order is never observable and an
/// item cannot lose availability between the read and the write.
///
/// Validation is fail-fast in input order; the first failing check wins.
pub fn place_order(
    conn: &mut PgConnection,
    customer_id: i32,
    restaurant_id: i32,
    items: &[ItemQuantity],
) -> Result<PlacedOrder, PlaceOrderError> {
    validate_items(items)?;

    conn.transaction(|conn| {
        schema::customers::table
            .find(customer_id)
            .select(models::Customer::as_select())
            .first(conn)
            .optional()?
            .ok_or(PlaceOrderError::CustomerNotFound)?;

        schema::restaurants::table
            .find(restaurant_id)
            .select(models::Restaurant::as_select())
            .first(conn)
            .optional()?
            .ok_or(PlaceOrderError::RestaurantNotFound)?;

        let mut total_price = BigDecimal::from(0);
        for item in items {
            let menu_item = schema::menu_items::table
                .find(item.menu_item_id)
                .select(models::MenuItem::as_select())
                .first(conn)
                .optional()?
                .ok_or(PlaceOrderError::MenuItemNotFound(item.menu_item_id))?;
            if !menu_item.is_available {
                return Err(PlaceOrderError::MenuItemUnavailable(item.menu_item_id));
            }
            total_price += menu_item.price * BigDecimal::from(item.quantity);
        }

        let order = insert_into(schema::orders::table)
            .values(&models::NewOrder {
                customer_id,
                restaurant_id,
                total_price,
                status: DEFAULT_ORDER_STATUS.to_string(),
            })
            .returning(models::Order::as_returning())
            .get_result(conn)?;

        let new_items = items
            .iter()
            .map(|i| models::NewOrderItem {
                order_id: order.id,
                menu_item_id: i.menu_item_id,
                quantity: i.quantity,
            })
            .collect::<Vec<_>>();
        let order_items = insert_into(schema::order_items::table)
            .values(&new_items)
            .returning(models::OrderItem::as_returning())
            .get_results(conn)?;

        Ok(PlacedOrder {
            order,
            items: order_items,
        })
    })
}

pub fn load_order(conn: &mut PgConnection, order_id: i32) -> QueryResult<Option<PlacedOrder>> {
    let order = match schema::orders::table
        .find(order_id)
        .select(models::Order::as_select())
        .first(conn)
        .optional()?
    {
        Some(order) => order,
        None => return Ok(None),
    };

    let items = models::OrderItem::belonging_to(&order)
        .select(models::OrderItem::as_select())
        .order(schema::order_items::id.asc())
        .load(conn)?;

    Ok(Some(PlacedOrder { order, items }))
}

pub fn list_customer_orders(
    conn: &mut PgConnection,
    customer_id: i32,
) -> QueryResult<Vec<PlacedOrder>> {
    let orders = schema::orders::table
        .filter(schema::orders::customer_id.eq(customer_id))
        .order(schema::orders::id.asc())
        .select(models::Order::as_select())
        .load(conn)?;

    let items = models::OrderItem::belonging_to(&orders)
        .select(models::OrderItem::as_select())
        .order(schema::order_items::id.asc())
        .load(conn)?
        .grouped_by(&orders);

    Ok(orders
        .into_iter()
        .zip(items)
        .map(|(order, items)| PlacedOrder { order, items })
        .collect())
}

pub fn set_status(
    conn: &mut PgConnection,
    order_id: i32,
    status: &str,
) -> QueryResult<Option<models::Order>> {
    update(schema::orders::table.find(order_id))
        .set(schema::orders::status.eq(status))
        .returning(models::Order::as_returning())
        .get_result(conn)
        .optional()
}
