use anyhow::{Context, Result};
use rusqlite::Connection;

use super::account::current_user;
use crate::db::{
    current_sequence_value, decrement_stock, fetch_order, fetch_product,
    fetch_products_for_store, fetch_store, fetch_stores, insert_order,
};
use crate::error::RetailError;
use crate::models::{NearbyStore, Order, Product, Session, Store};
use crate::nearby::{distance, stores_within, NEARBY_RADIUS};

/// What the customer asked for at the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub store_id: i64,
    pub product_name: String,
    pub units: i64,
}

/// Stores within the fixed radius of the user's stored location, in table
/// order. Both the store list and the order flow go through here.
pub fn nearby_stores(conn: &Connection, session: &Session) -> Result<Vec<NearbyStore>> {
    let user = current_user(conn, session)?;
    let stores = fetch_stores(conn)?;
    let total = stores.len();
    let nearby = stores_within(&user, stores, NEARBY_RADIUS);
    log::debug!("{} of {total} stores within {NEARBY_RADIUS} of user #{}", nearby.len(), user.id);
    Ok(nearby)
}

/// Products of one store, failing when the store id is unknown.
pub fn store_products(conn: &Connection, store_id: i64) -> Result<(Store, Vec<Product>)> {
    let store = fetch_store(conn, store_id)?.ok_or(RetailError::StoreNotFound(store_id))?;
    let products = fetch_products_for_store(conn, store_id)?;
    Ok((store, products))
}

/// Quantity validation shared by the prompt and the commit.
pub fn check_quantity(product: &Product, units: i64) -> Result<(), RetailError> {
    if units < 1 {
        return Err(RetailError::InvalidQuantity(units));
    }
    if units > product.units {
        return Err(RetailError::InsufficientStock {
            product: product.name.clone(),
            available: product.units,
            requested: units,
        });
    }
    Ok(())
}

/// Record the order and take the units out of stock in one transaction.
///
/// The stock decrement is conditional on enough units still being on hand, so
/// two sessions racing for the last units cannot both succeed; the loser gets
/// `InsufficientStock` and nothing is written.
pub fn place_order(conn: &mut Connection, session: &Session, request: &OrderRequest) -> Result<Order> {
    let user = current_user(conn, session)?;
    let store = fetch_store(conn, request.store_id)?
        .ok_or(RetailError::StoreNotFound(request.store_id))?;
    if distance(user.latitude, user.longitude, store.latitude, store.longitude) > NEARBY_RADIUS {
        return Err(RetailError::StoreNotVisible(store.id).into());
    }

    let tx = conn.transaction().context("failed to start order transaction")?;

    let product = fetch_product(&tx, request.store_id, &request.product_name)?.ok_or_else(|| {
        RetailError::ProductNotFound {
            store_id: request.store_id,
            product: request.product_name.clone(),
        }
    })?;
    check_quantity(&product, request.units)?;

    if !decrement_stock(&tx, product.store_id, &product.name, request.units)? {
        // Stock moved between the read and the update.
        return Err(RetailError::InsufficientStock {
            product: product.name,
            available: product.units,
            requested: request.units,
        }
        .into());
    }

    insert_order(&tx, user.id, product.store_id, &product.name, request.units)?;
    let number = current_sequence_value(&tx, "Orders", "orderNumber")?
        .context("order sequence was not advanced")?;
    let order = fetch_order(&tx, number)?.context("new order row is missing")?;

    tx.commit().context("failed to commit order")?;
    log::info!(
        "order #{} placed by user #{}: {} x {} at store {}",
        order.number,
        order.customer_id,
        order.units_ordered,
        order.product_name,
        order.store_id
    );
    Ok(order)
}
