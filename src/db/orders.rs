use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::Order;

/// Database-side timestamp truncated to the minute. Shared by every insert
/// that records when something happened.
pub(crate) const MINUTE_NOW: &str = "strftime('%Y-%m-%d %H:%M', 'now', 'localtime')";

/// Insert an order row stamped with the database clock.
pub fn insert_order(
    conn: &Connection,
    customer_id: i64,
    store_id: i64,
    product_name: &str,
    units: i64,
) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO Orders (customerID, storeID, productName, unitsOrdered, orderTime)
             VALUES (?1, ?2, ?3, ?4, {MINUTE_NOW})"
        ),
        params![customer_id, store_id, product_name, units],
    )
    .context("failed to insert order")?;
    Ok(())
}

pub fn fetch_order(conn: &Connection, number: i64) -> Result<Option<Order>> {
    conn.query_row(
        "SELECT orderNumber, customerID, storeID, productName, unitsOrdered, orderTime
         FROM Orders
         WHERE orderNumber = ?1",
        [number],
        |row| {
            Ok(Order {
                number: row.get(0)?,
                customer_id: row.get(1)?,
                store_id: row.get(2)?,
                product_name: row.get(3)?,
                units_ordered: row.get(4)?,
                order_time: row.get(5)?,
            })
        },
    )
    .optional()
    .context("failed to load order")
}
