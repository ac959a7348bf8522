use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;

use crate::{models, schema};

pub const TOP_CUSTOMERS_LIMIT: i64 = 5;

/// Top customers by order count: grouping, counting, and truncation are
/// delegated to the database, then each row is joined back against the
/// customer record. Ties break on customer id ascending so the output is
/// deterministic.
pub fn top_customers(conn: &mut PgConnection) -> QueryResult<Vec<(models::Customer, i64)>> {
    let counts = schema::orders::table
        .group_by(schema::orders::customer_id)
        .select((schema::orders::customer_id, count_star()))
        .order((count_star().desc(), schema::orders::customer_id.asc()))
        .limit(TOP_CUSTOMERS_LIMIT)
        .load::<(i32, i64)>(conn)?;

    let ids = counts.iter().map(|(id, _)| *id).collect::<Vec<_>>();
    let mut customers = schema::customers::table
        .filter(schema::customers::id.eq_any(&ids))
        .select(models::Customer::as_select())
        .load(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect::<HashMap<_, _>>();

    // Preserve the ordering produced by the aggregate query.
    Ok(counts
        .into_iter()
        .filter_map(|(id, count)| customers.remove(&id).map(|c| (c, count)))
        .collect())
}

/// Top menu item by total quantity sold across all orders.
pub fn top_menu_item(conn: &mut PgConnection) -> QueryResult<Option<(models::MenuItem, i64)>> {
    let top = schema::order_items::table
        .group_by(schema::order_items::menu_item_id)
        .select((
            schema::order_items::menu_item_id,
            sum(schema::order_items::quantity),
        ))
        .order((
            sum(schema::order_items::quantity).desc(),
            schema::order_items::menu_item_id.asc(),
        ))
        .limit(1)
        .load::<(i32, Option<i64>)>(conn)?;

    match top.into_iter().next() {
        Some((menu_item_id, quantity)) => {
            let menu_item = schema::menu_items::table
                .find(menu_item_id)
                .select(models::MenuItem::as_select())
                .first(conn)?;
            Ok(Some((menu_item, quantity.unwrap_or(0))))
        }
        None => Ok(None),
    }
}

/// Revenue for a restaurant: the stored order totals are summed here
/// rather than in SQL, mirroring the upstream behavior. A restaurant
/// with no orders yields zero, not an error.
pub fn restaurant_revenue(conn: &mut PgConnection, restaurant_id: i32) -> QueryResult<BigDecimal> {
    let totals = schema::orders::table
        .filter(schema::orders::restaurant_id.eq(restaurant_id))
        .select(schema::orders::total_price)
        .load::<BigDecimal>(conn)?;

    Ok(totals.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        insert_customer, insert_menu_item, insert_order, insert_order_item, insert_restaurant,
        lock, reset_database, test_store,
    };

    #[test]
    fn test_top_customers_limited_and_sorted() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let restaurant = insert_restaurant(conn, "Gilded Spoon");

        // Six customers with 6, 5, ... 1 orders each; only five may come back.
        let mut expected = Vec::new();
        for n in (1..=6).rev() {
            let customer = insert_customer(
                conn,
                &format!("Customer {n}"),
                &format!("customer{n}@example.com"),
            );
            for _ in 0..n {
                insert_order(conn, customer.id, restaurant.id, "10.00");
            }
            expected.push((customer.id, n as i64));
        }

        let top = top_customers(conn).unwrap();
        assert_eq!(top.len(), TOP_CUSTOMERS_LIMIT as usize);
        let got = top
            .iter()
            .map(|(c, count)| (c.id, *count))
            .collect::<Vec<_>>();
        assert_eq!(got, expected[..5].to_vec());
    }

    #[test]
    fn test_top_customers_tie_breaks_by_id_ascending() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let restaurant = insert_restaurant(conn, "Gilded Spoon");
        let frequent = insert_customer(conn, "Frequent", "frequent@example.com");
        let tied_first = insert_customer(conn, "Tied First", "tied.first@example.com");
        let tied_second = insert_customer(conn, "Tied Second", "tied.second@example.com");

        for _ in 0..3 {
            insert_order(conn, frequent.id, restaurant.id, "10.00");
        }
        // Equal counts; the lower id must come first.
        for _ in 0..2 {
            insert_order(conn, tied_second.id, restaurant.id, "10.00");
            insert_order(conn, tied_first.id, restaurant.id, "10.00");
        }

        let got = top_customers(conn)
            .unwrap()
            .iter()
            .map(|(c, count)| (c.id, *count))
            .collect::<Vec<_>>();
        assert_eq!(
            got,
            vec![(frequent.id, 3), (tied_first.id, 2), (tied_second.id, 2)]
        );
    }

    #[test]
    fn test_top_customers_empty() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        assert!(top_customers(conn).unwrap().is_empty());
    }

    #[test]
    fn test_top_menu_item_sums_quantities() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let customer = insert_customer(conn, "Alice", "alice@example.com");
        let restaurant = insert_restaurant(conn, "Gilded Spoon");
        let pasta = insert_menu_item(conn, restaurant.id, "Pasta", "10.00", true);
        let salad = insert_menu_item(conn, restaurant.id, "Salad", "4.50", true);

        let first = insert_order(conn, customer.id, restaurant.id, "24.50");
        insert_order_item(conn, first.id, pasta.id, 2);
        insert_order_item(conn, first.id, salad.id, 1);
        let second = insert_order(conn, customer.id, restaurant.id, "13.50");
        insert_order_item(conn, second.id, salad.id, 3);

        let (menu_item, quantity) = top_menu_item(conn).unwrap().unwrap();
        assert_eq!(menu_item.id, salad.id);
        assert_eq!(quantity, 4);
    }

    #[test]
    fn test_top_menu_item_tie_breaks_by_id_ascending() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let customer = insert_customer(conn, "Alice", "alice@example.com");
        let restaurant = insert_restaurant(conn, "Gilded Spoon");
        let pasta = insert_menu_item(conn, restaurant.id, "Pasta", "10.00", true);
        let salad = insert_menu_item(conn, restaurant.id, "Salad", "4.50", true);

        // Both items sold the same quantity; the lower id must win.
        let order = insert_order(conn, customer.id, restaurant.id, "29.00");
        insert_order_item(conn, order.id, salad.id, 2);
        insert_order_item(conn, order.id, pasta.id, 2);

        let (menu_item, quantity) = top_menu_item(conn).unwrap().unwrap();
        assert_eq!(menu_item.id, pasta.id);
        assert_eq!(quantity, 2);
    }

    #[test]
    fn test_top_menu_item_empty() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        assert!(top_menu_item(conn).unwrap().is_none());
    }

    #[test]
    fn test_restaurant_revenue_sums_order_totals() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let customer = insert_customer(conn, "Alice", "alice@example.com");
        let restaurant = insert_restaurant(conn, "Gilded Spoon");
        let other = insert_restaurant(conn, "Rival Diner");
        insert_order(conn, customer.id, restaurant.id, "10.00");
        insert_order(conn, customer.id, restaurant.id, "12.50");
        insert_order(conn, customer.id, other.id, "99.00");

        let revenue = restaurant_revenue(conn, restaurant.id).unwrap();
        assert_eq!(revenue, "22.50".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_restaurant_revenue_zero_without_orders() {
        let Some(store) = test_store() else { return };
        let _guard = lock();
        let conn = &mut store.conn().unwrap();
        reset_database(conn);

        let restaurant = insert_restaurant(conn, "Gilded Spoon");
        let revenue = restaurant_revenue(conn, restaurant.id).unwrap();
        assert_eq!(revenue, BigDecimal::from(0));
    }
}
