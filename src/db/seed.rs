use anyhow::{Context, Result};
use rusqlite::Connection;

use super::products::insert_product;
use super::stores::insert_store;
use super::users::{count_users, insert_user};
use crate::models::{NewUser, Role};

/// Products every demo store starts with: name, units, price per unit.
const DEMO_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Apples", 40, 2),
    ("Bread", 25, 4),
    ("Coffee", 15, 9),
    ("Milk", 30, 3),
];

/// Populate an empty database with an admin, a manager, a customer, three
/// stores and their products. Returns `false` without touching anything when
/// users already exist.
pub fn seed_demo_data(conn: &mut Connection) -> Result<bool> {
    if count_users(conn)? > 0 {
        return Ok(false);
    }

    let tx = conn.transaction().context("failed to start seed transaction")?;

    let admin = insert_user(&tx, &demo_user("admin", 50.0, 50.0), Role::Admin)?;
    let manager = insert_user(&tx, &demo_user("manager", 12.0, 20.0), Role::Manager)?;
    insert_user(&tx, &demo_user("alice", 10.0, 10.0), Role::Customer)?;

    let stores = [
        insert_store(&tx, "Corner Market", 10.0, 10.0, manager.id)?,
        insert_store(&tx, "Hillside Grocers", 10.0, 35.0, manager.id)?,
        insert_store(&tx, "Harbor Outlet", 50.0, 50.0, admin.id)?,
    ];

    for store in &stores {
        for (name, units, price) in DEMO_PRODUCTS {
            insert_product(&tx, store.id, name, *units, *price)?;
        }
    }

    tx.commit().context("failed to commit demo data")?;
    log::info!("seeded demo data: 3 users, {} stores", stores.len());
    Ok(true)
}

/// Demo accounts use their name as password.
fn demo_user(name: &str, latitude: f64, longitude: f64) -> NewUser {
    NewUser {
        name: name.to_string(),
        password: name.to_string(),
        latitude,
        longitude,
    }
}
