use std::sync::{Mutex, MutexGuard, PoisonError};

use bigdecimal::BigDecimal;
use diesel::{insert_into, prelude::*};

use crate::store::Store;
use crate::{models, schema};

// Database-backed tests share one database, so they serialize on this
// lock and truncate all tables before running.
static DB_LOCK: Mutex<()> = Mutex::new(());

pub fn lock() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns `None` when no test database is configured, letting the
/// database-backed tests skip instead of fail.
pub fn test_store() -> Option<Store> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(Store::connect(&database_url).expect("Failed to connect to test database"))
}

pub fn reset_database(conn: &mut PgConnection) {
    diesel::delete(schema::order_items::table)
        .execute(conn)
        .unwrap();
    diesel::delete(schema::orders::table).execute(conn).unwrap();
    diesel::delete(schema::menu_items::table)
        .execute(conn)
        .unwrap();
    diesel::delete(schema::restaurants::table)
        .execute(conn)
        .unwrap();
    diesel::delete(schema::customers::table)
        .execute(conn)
        .unwrap();
}

pub fn insert_customer(conn: &mut PgConnection, name: &str, email: &str) -> models::Customer {
    insert_into(schema::customers::table)
        .values(&models::NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
            phone_number: "010-0000-0000".to_string(),
            address: "1 Test Street".to_string(),
        })
        .returning(models::Customer::as_returning())
        .get_result(conn)
        .unwrap()
}

pub fn insert_restaurant(conn: &mut PgConnection, name: &str) -> models::Restaurant {
    insert_into(schema::restaurants::table)
        .values(&models::NewRestaurant {
            name: name.to_string(),
            location: "Test City".to_string(),
        })
        .returning(models::Restaurant::as_returning())
        .get_result(conn)
        .unwrap()
}

pub fn insert_menu_item(
    conn: &mut PgConnection,
    restaurant_id: i32,
    name: &str,
    price: &str,
    is_available: bool,
) -> models::MenuItem {
    insert_into(schema::menu_items::table)
        .values(&models::NewMenuItem {
            restaurant_id,
            name: name.to_string(),
            price: price.parse::<BigDecimal>().unwrap(),
            is_available,
        })
        .returning(models::MenuItem::as_returning())
        .get_result(conn)
        .unwrap()
}

pub fn insert_order(
    conn: &mut PgConnection,
    customer_id: i32,
    restaurant_id: i32,
    total_price: &str,
) -> models::Order {
    insert_into(schema::orders::table)
        .values(&models::NewOrder {
            customer_id,
            restaurant_id,
            total_price: total_price.parse::<BigDecimal>().unwrap(),
            status: crate::orders::DEFAULT_ORDER_STATUS.to_string(),
        })
        .returning(models::Order::as_returning())
        .get_result(conn)
        .unwrap()
}

pub fn insert_order_item(
    conn: &mut PgConnection,
    order_id: i32,
    menu_item_id: i32,
    quantity: i32,
) -> models::OrderItem {
    insert_into(schema::order_items::table)
        .values(&models::NewOrderItem {
            order_id,
            menu_item_id,
            quantity,
        })
        .returning(models::OrderItem::as_returning())
        .get_result(conn)
        .unwrap()
}
