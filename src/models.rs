use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::{customers, menu_items, order_items, orders, restaurants};

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq)]
#[diesel(table_name = customers)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub location: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub location: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = menu_items)]
pub struct MenuItem {
    pub id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub is_available: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItem {
    pub restaurant_id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub is_available: bool,
}

/// Price and availability are the only mutable menu item fields;
/// `restaurant_id` never changes after creation.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = menu_items)]
pub struct MenuItemChangeset {
    pub price: Option<BigDecimal>,
    pub is_available: Option<bool>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, PartialEq)]
#[diesel(belongs_to(Customer))]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub restaurant_id: i32,
    pub total_price: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub customer_id: i32,
    pub restaurant_id: i32,
    pub total_price: BigDecimal,
    pub status: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(MenuItem))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
}
