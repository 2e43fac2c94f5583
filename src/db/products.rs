use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::shim::run_update;
use crate::models::Product;

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        store_id: row.get(0)?,
        name: row.get(1)?,
        units: row.get(2)?,
        price_per_unit: row.get(3)?,
    })
}

/// All products stocked by one store, alphabetically.
pub fn fetch_products_for_store(conn: &Connection, store_id: i64) -> Result<Vec<Product>> {
    let mut stmt = conn
        .prepare(
            "SELECT storeID, productName, numberOfUnits, pricePerUnit
             FROM Product
             WHERE storeID = ?1
             ORDER BY productName COLLATE NOCASE",
        )
        .context("failed to prepare product query")?;

    let products = stmt
        .query_map([store_id], product_from_row)
        .context("failed to load products")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect products")?;

    Ok(products)
}

pub fn fetch_product(conn: &Connection, store_id: i64, name: &str) -> Result<Option<Product>> {
    conn.query_row(
        "SELECT storeID, productName, numberOfUnits, pricePerUnit
         FROM Product
         WHERE storeID = ?1 AND productName = ?2",
        params![store_id, name],
        product_from_row,
    )
    .optional()
    .context("failed to load product")
}

pub fn insert_product(
    conn: &Connection,
    store_id: i64,
    name: &str,
    units: i64,
    price_per_unit: i64,
) -> Result<Product> {
    conn.execute(
        "INSERT INTO Product (storeID, productName, numberOfUnits, pricePerUnit)
         VALUES (?1, ?2, ?3, ?4)",
        params![store_id, name, units, price_per_unit],
    )
    .context("failed to insert product")?;

    Ok(Product {
        store_id,
        name: name.to_string(),
        units,
        price_per_unit,
    })
}

/// Take `units` out of stock, but only if at least that many are on hand.
/// Returns whether the row was updated; `false` means the stock was too low
/// (or the product is gone).
pub fn decrement_stock(conn: &Connection, store_id: i64, name: &str, units: i64) -> Result<bool> {
    let updated = run_update(
        conn,
        "UPDATE Product
         SET numberOfUnits = numberOfUnits - ?3
         WHERE storeID = ?1 AND productName = ?2 AND numberOfUnits >= ?3",
        params![store_id, name, units],
    )?;
    Ok(updated == 1)
}

/// Add `units` to the stock. Returns whether the product existed.
pub fn increment_stock(conn: &Connection, store_id: i64, name: &str, units: i64) -> Result<bool> {
    let updated = run_update(
        conn,
        "UPDATE Product
         SET numberOfUnits = numberOfUnits + ?3
         WHERE storeID = ?1 AND productName = ?2",
        params![store_id, name, units],
    )?;
    Ok(updated == 1)
}

/// Overwrite units and price in one statement. Returns whether the product
/// existed.
pub fn set_units_and_price(
    conn: &Connection,
    store_id: i64,
    name: &str,
    units: i64,
    price_per_unit: i64,
) -> Result<bool> {
    let updated = run_update(
        conn,
        "UPDATE Product
         SET numberOfUnits = ?3, pricePerUnit = ?4
         WHERE storeID = ?1 AND productName = ?2",
        params![store_id, name, units, price_per_unit],
    )?;
    Ok(updated == 1)
}
