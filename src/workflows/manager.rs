use anyhow::{Context, Result};
use rusqlite::Connection;

use super::account::current_user;
use crate::db::{
    current_sequence_value, fetch_managed_stores, fetch_product, fetch_product_update,
    fetch_store, fetch_stores, fetch_supply_request, increment_stock, insert_product_update,
    insert_supply_request, run_query_count, set_units_and_price,
};
use crate::error::RetailError;
use crate::models::{Product, ProductUpdate, Role, Session, Store, SupplyRequest};

/// Re-check the session user's role against `Users` before a privileged
/// action. Fails with `NotAuthorized` unless the stored type is manager or
/// admin.
pub fn require_manager(conn: &Connection, session: &Session) -> Result<()> {
    let matches = run_query_count(
        conn,
        "SELECT userID FROM Users
         WHERE userID = ?1 AND LOWER(TRIM(type)) IN ('manager', 'admin')",
        [session.user_id()],
    )?;

    if matches == 0 {
        log::warn!(
            "user #{} ({}) refused a manager-only action",
            session.user_id(),
            session.user.name
        );
        return Err(RetailError::NotAuthorized.into());
    }
    Ok(())
}

/// Stores the user may act on: every store for an admin, otherwise the stores
/// they manage.
pub fn visible_stores(conn: &Connection, session: &Session) -> Result<Vec<Store>> {
    require_manager(conn, session)?;
    let user = current_user(conn, session)?;
    if user.role == Role::Admin {
        fetch_stores(conn)
    } else {
        fetch_managed_stores(conn, user.id)
    }
}

fn visible_store(conn: &Connection, actor_id: i64, role: Role, store_id: i64) -> Result<Store> {
    let store = fetch_store(conn, store_id)?.ok_or(RetailError::StoreNotFound(store_id))?;
    if role != Role::Admin && store.manager_id != actor_id {
        return Err(RetailError::StoreNotVisible(store_id).into());
    }
    Ok(store)
}

/// Which product fields an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Quantity,
    Price,
    Both,
}

impl UpdateKind {
    pub fn touches_quantity(self) -> bool {
        matches!(self, UpdateKind::Quantity | UpdateKind::Both)
    }

    pub fn touches_price(self) -> bool {
        matches!(self, UpdateKind::Price | UpdateKind::Both)
    }
}

/// New values for a product. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChange {
    pub store_id: i64,
    pub product_name: String,
    pub units: Option<i64>,
    pub price_per_unit: Option<i64>,
}

impl ProductChange {
    /// The product as it will look once the change is applied.
    pub fn apply_to(&self, before: &Product) -> Product {
        Product {
            store_id: before.store_id,
            name: before.name.clone(),
            units: self.units.unwrap_or(before.units),
            price_per_unit: self.price_per_unit.unwrap_or(before.price_per_unit),
        }
    }

    fn validate(&self) -> Result<(), RetailError> {
        if self.units.is_none() && self.price_per_unit.is_none() {
            return Err(RetailError::InvalidInput("Nothing to update.".to_string()));
        }
        if self.units.is_some_and(|units| units < 0) {
            return Err(RetailError::InvalidInput(
                "Number of units cannot be negative.".to_string(),
            ));
        }
        if self.price_per_unit.is_some_and(|price| price < 0) {
            return Err(RetailError::InvalidInput("Price cannot be negative.".to_string()));
        }
        Ok(())
    }
}

/// Before/after snapshot of an applied update plus the audit row, if one was
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChangeOutcome {
    pub before: Product,
    pub after: Product,
    pub audit: Option<ProductUpdate>,
}

/// Apply a product change. The product row and the audit entry commit
/// together; admins (by role) are not audited.
pub fn update_product(
    conn: &mut Connection,
    session: &Session,
    change: &ProductChange,
) -> Result<ProductChangeOutcome> {
    require_manager(conn, session)?;
    let actor = current_user(conn, session)?;
    visible_store(conn, actor.id, actor.role, change.store_id)?;
    change.validate()?;

    let tx = conn.transaction().context("failed to start update transaction")?;

    let before = fetch_product(&tx, change.store_id, &change.product_name)?.ok_or_else(|| {
        RetailError::ProductNotFound {
            store_id: change.store_id,
            product: change.product_name.clone(),
        }
    })?;
    let after = change.apply_to(&before);
    set_units_and_price(&tx, after.store_id, &after.name, after.units, after.price_per_unit)?;

    let audit = if actor.role == Role::Admin {
        None
    } else {
        insert_product_update(&tx, actor.id, after.store_id, &after.name)?;
        let number = current_sequence_value(&tx, "ProductUpdates", "updateNumber")?
            .context("update sequence was not advanced")?;
        fetch_product_update(&tx, number)?
    };

    tx.commit().context("failed to commit product update")?;
    log::info!(
        "user #{} updated {} at store {}: units {} -> {}, price {} -> {}",
        actor.id,
        after.name,
        after.store_id,
        before.units,
        after.units,
        before.price_per_unit,
        after.price_per_unit
    );

    Ok(ProductChangeOutcome {
        before,
        after,
        audit,
    })
}

/// Input for a supply request to a warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyDraft {
    pub store_id: i64,
    pub product_name: String,
    pub units: i64,
    pub warehouse_id: i64,
}

/// Record the supply request and add the units to the store's stock in one
/// transaction.
pub fn request_supply(
    conn: &mut Connection,
    session: &Session,
    draft: &SupplyDraft,
) -> Result<SupplyRequest> {
    require_manager(conn, session)?;
    let actor = current_user(conn, session)?;
    visible_store(conn, actor.id, actor.role, draft.store_id)?;
    if draft.units < 1 {
        return Err(RetailError::InvalidQuantity(draft.units).into());
    }
    if draft.warehouse_id < 1 {
        return Err(
            RetailError::InvalidInput("Warehouse id must be a positive number.".to_string()).into(),
        );
    }

    let tx = conn.transaction().context("failed to start supply transaction")?;

    let product = fetch_product(&tx, draft.store_id, &draft.product_name)?.ok_or_else(|| {
        RetailError::ProductNotFound {
            store_id: draft.store_id,
            product: draft.product_name.clone(),
        }
    })?;

    insert_supply_request(
        &tx,
        actor.id,
        draft.warehouse_id,
        product.store_id,
        &product.name,
        draft.units,
    )?;
    increment_stock(&tx, product.store_id, &product.name, draft.units)?;
    let number = current_sequence_value(&tx, "ProductSupplyRequests", "requestNumber")?
        .context("supply request sequence was not advanced")?;
    let request = fetch_supply_request(&tx, number)?.context("new supply request is missing")?;

    tx.commit().context("failed to commit supply request")?;
    log::info!(
        "supply request #{} by user #{}: {} x {} for store {} from warehouse {}",
        request.number,
        request.manager_id,
        request.units_requested,
        request.product_name,
        request.store_id,
        request.warehouse_id
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> Product {
        Product {
            store_id: 2,
            name: "Milk".to_string(),
            units: 10,
            price_per_unit: 3,
        }
    }

    fn change(units: Option<i64>, price_per_unit: Option<i64>) -> ProductChange {
        ProductChange {
            store_id: 2,
            product_name: "Milk".to_string(),
            units,
            price_per_unit,
        }
    }

    #[test]
    fn apply_keeps_untouched_fields() {
        let after = change(Some(4), None).apply_to(&milk());
        assert_eq!((after.units, after.price_per_unit), (4, 3));

        let after = change(None, Some(7)).apply_to(&milk());
        assert_eq!((after.units, after.price_per_unit), (10, 7));
    }

    #[test]
    fn empty_or_negative_changes_are_invalid() {
        assert!(change(None, None).validate().is_err());
        assert!(change(Some(-1), None).validate().is_err());
        assert!(change(None, Some(-5)).validate().is_err());
        assert!(change(Some(0), Some(0)).validate().is_ok());
    }

    #[test]
    fn update_kind_flags() {
        assert!(UpdateKind::Both.touches_quantity() && UpdateKind::Both.touches_price());
        assert!(!UpdateKind::Price.touches_quantity());
        assert!(!UpdateKind::Quantity.touches_price());
    }
}
