//! Shared fixtures: a seeded in-memory database and a dump of every table so
//! tests can assert that nothing changed.
#![allow(dead_code)]

use anyhow::Result;
use rusqlite::Connection;

use retail_terminal::db::{open_in_memory, run_query_rows, seed_demo_data};
use retail_terminal::models::{QueryResult, Session};
use retail_terminal::workflows::log_in;

pub const ADMIN: &str = "admin";
pub const MANAGER: &str = "manager";
pub const CUSTOMER: &str = "alice";

pub const CORNER_MARKET: i64 = 1;
pub const HILLSIDE_GROCERS: i64 = 2;
pub const HARBOR_OUTLET: i64 = 3;

/// Demo data: admin #1 at (50,50), manager #2 at (12,20), alice #3 at (10,10).
/// The manager runs stores 1 and 2; the admin runs store 3.
pub fn seeded() -> Result<Connection> {
    let mut conn = open_in_memory()?;
    seed_demo_data(&mut conn)?;
    Ok(conn)
}

/// Demo users log in with their name as password.
pub fn session_for(conn: &Connection, name: &str) -> Result<Session> {
    log_in(conn, name, name)
}

pub fn units_of(conn: &Connection, store_id: i64, product: &str) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT numberOfUnits FROM Product WHERE storeID = ?1 AND productName = ?2",
        rusqlite::params![store_id, product],
        |row| row.get(0),
    )?)
}

pub fn row_count(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
}

/// Every row of every table, in key order.
pub fn snapshot(conn: &Connection) -> Result<Vec<QueryResult>> {
    [
        "SELECT * FROM Users ORDER BY userID",
        "SELECT * FROM Store ORDER BY storeID",
        "SELECT * FROM Product ORDER BY storeID, productName",
        "SELECT * FROM Orders ORDER BY orderNumber",
        "SELECT * FROM ProductUpdates ORDER BY updateNumber",
        "SELECT * FROM ProductSupplyRequests ORDER BY requestNumber",
    ]
    .iter()
    .map(|sql| run_query_rows(conn, sql, []))
    .collect()
}
