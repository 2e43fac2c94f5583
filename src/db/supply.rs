use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::SupplyRequest;

pub fn insert_supply_request(
    conn: &Connection,
    manager_id: i64,
    warehouse_id: i64,
    store_id: i64,
    product_name: &str,
    units: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO ProductSupplyRequests
            (managerID, warehouseID, storeID, productName, unitsRequested)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![manager_id, warehouse_id, store_id, product_name, units],
    )
    .context("failed to insert supply request")?;
    Ok(())
}

pub fn fetch_supply_request(conn: &Connection, number: i64) -> Result<Option<SupplyRequest>> {
    conn.query_row(
        "SELECT requestNumber, managerID, warehouseID, storeID, productName, unitsRequested
         FROM ProductSupplyRequests
         WHERE requestNumber = ?1",
        [number],
        |row| {
            Ok(SupplyRequest {
                number: row.get(0)?,
                manager_id: row.get(1)?,
                warehouse_id: row.get(2)?,
                store_id: row.get(3)?,
                product_name: row.get(4)?,
                units_requested: row.get(5)?,
            })
        },
    )
    .optional()
    .context("failed to load supply request")
}
