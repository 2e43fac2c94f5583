use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::orders::MINUTE_NOW;
use crate::models::ProductUpdate;

/// Append an audit row for a manager's product edit.
pub fn insert_product_update(
    conn: &Connection,
    manager_id: i64,
    store_id: i64,
    product_name: &str,
) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO ProductUpdates (managerID, storeID, productName, updatedOn)
             VALUES (?1, ?2, ?3, {MINUTE_NOW})"
        ),
        params![manager_id, store_id, product_name],
    )
    .context("failed to record product update")?;
    Ok(())
}

pub fn fetch_product_update(conn: &Connection, number: i64) -> Result<Option<ProductUpdate>> {
    conn.query_row(
        "SELECT updateNumber, managerID, storeID, productName, updatedOn
         FROM ProductUpdates
         WHERE updateNumber = ?1",
        [number],
        |row| {
            Ok(ProductUpdate {
                number: row.get(0)?,
                manager_id: row.get(1)?,
                store_id: row.get(2)?,
                product_name: row.get(3)?,
                updated_on: row.get(4)?,
            })
        },
    )
    .optional()
    .context("failed to load product update")
}
