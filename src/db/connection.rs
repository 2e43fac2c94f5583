use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (or create) the SQLite database at `path`, enable foreign keys, and
/// run the lazy migrations. The returned connection is the only one the
/// program uses until shutdown.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    prepare_connection(&conn)?;
    Ok(conn)
}

/// Throwaway database with the full schema. Tests and dry runs use this.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    prepare_connection(&conn)?;
    Ok(conn)
}

fn prepare_connection(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    ensure_schema(conn)
}

/// Create every table the retail workflows touch. `AUTOINCREMENT` keys make
/// SQLite record the last handed-out id in `sqlite_sequence`, which is what
/// the shim reads back as the current sequence value.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Users (
            userID INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            type TEXT NOT NULL DEFAULT 'customer'
        )",
        [],
    )
    .context("failed to create Users table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Store (
            storeID INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            managerID INTEGER NOT NULL,
            FOREIGN KEY(managerID) REFERENCES Users(userID)
        )",
        [],
    )
    .context("failed to create Store table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Product (
            storeID INTEGER NOT NULL,
            productName TEXT NOT NULL,
            numberOfUnits INTEGER NOT NULL CHECK (numberOfUnits >= 0),
            pricePerUnit INTEGER NOT NULL CHECK (pricePerUnit >= 0),
            PRIMARY KEY (storeID, productName),
            FOREIGN KEY(storeID) REFERENCES Store(storeID) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create Product table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Orders (
            orderNumber INTEGER PRIMARY KEY AUTOINCREMENT,
            customerID INTEGER NOT NULL,
            storeID INTEGER NOT NULL,
            productName TEXT NOT NULL,
            unitsOrdered INTEGER NOT NULL CHECK (unitsOrdered > 0),
            orderTime TEXT NOT NULL,
            FOREIGN KEY(customerID) REFERENCES Users(userID),
            FOREIGN KEY(storeID, productName) REFERENCES Product(storeID, productName)
        )",
        [],
    )
    .context("failed to create Orders table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ProductUpdates (
            updateNumber INTEGER PRIMARY KEY AUTOINCREMENT,
            managerID INTEGER NOT NULL,
            storeID INTEGER NOT NULL,
            productName TEXT NOT NULL,
            updatedOn TEXT NOT NULL,
            FOREIGN KEY(managerID) REFERENCES Users(userID),
            FOREIGN KEY(storeID, productName) REFERENCES Product(storeID, productName)
        )",
        [],
    )
    .context("failed to create ProductUpdates table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ProductSupplyRequests (
            requestNumber INTEGER PRIMARY KEY AUTOINCREMENT,
            managerID INTEGER NOT NULL,
            warehouseID INTEGER NOT NULL,
            storeID INTEGER NOT NULL,
            productName TEXT NOT NULL,
            unitsRequested INTEGER NOT NULL CHECK (unitsRequested > 0),
            FOREIGN KEY(managerID) REFERENCES Users(userID),
            FOREIGN KEY(storeID, productName) REFERENCES Product(storeID, productName)
        )",
        [],
    )
    .context("failed to create ProductSupplyRequests table")?;

    Ok(())
}
