use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::Store;

fn store_from_row(row: &Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        manager_id: row.get(4)?,
    })
}

/// Every store in table order. The nearby filter keeps this order, so the
/// `ORDER BY` here is what the user sees.
pub fn fetch_stores(conn: &Connection) -> Result<Vec<Store>> {
    let mut stmt = conn
        .prepare(
            "SELECT storeID, name, latitude, longitude, managerID
             FROM Store
             ORDER BY storeID",
        )
        .context("failed to prepare store query")?;

    let stores = stmt
        .query_map([], store_from_row)
        .context("failed to load stores")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect stores")?;

    Ok(stores)
}

/// Stores whose `managerID` points at the given user.
pub fn fetch_managed_stores(conn: &Connection, manager_id: i64) -> Result<Vec<Store>> {
    let mut stmt = conn
        .prepare(
            "SELECT storeID, name, latitude, longitude, managerID
             FROM Store
             WHERE managerID = ?1
             ORDER BY storeID",
        )
        .context("failed to prepare managed store query")?;

    let stores = stmt
        .query_map([manager_id], store_from_row)
        .context("failed to load managed stores")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect managed stores")?;

    Ok(stores)
}

pub fn fetch_store(conn: &Connection, id: i64) -> Result<Option<Store>> {
    conn.query_row(
        "SELECT storeID, name, latitude, longitude, managerID FROM Store WHERE storeID = ?1",
        [id],
        store_from_row,
    )
    .optional()
    .context("failed to load store")
}

/// Insert a store row. Only the demo seeder creates stores; the schema owner
/// normally loads them.
pub fn insert_store(
    conn: &Connection,
    name: &str,
    latitude: f64,
    longitude: f64,
    manager_id: i64,
) -> Result<Store> {
    conn.execute(
        "INSERT INTO Store (name, latitude, longitude, managerID) VALUES (?1, ?2, ?3, ?4)",
        params![name, latitude, longitude, manager_id],
    )
    .context("failed to insert store")?;

    Ok(Store {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        latitude,
        longitude,
        manager_id,
    })
}
