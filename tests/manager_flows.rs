mod common;

use testresult::TestResult;

use retail_terminal::db::{insert_user, run_query_rows, run_update};
use retail_terminal::models::{NewUser, Role};
use retail_terminal::workflows::{
    log_in, request_supply, require_manager, update_product, visible_stores, ProductChange,
    SupplyDraft,
};
use retail_terminal::RetailError;

use common::{
    row_count, seeded, session_for, snapshot, units_of, ADMIN, CORNER_MARKET, CUSTOMER,
    HARBOR_OUTLET, HILLSIDE_GROCERS, MANAGER,
};

fn change(store_id: i64, product: &str, units: Option<i64>, price: Option<i64>) -> ProductChange {
    ProductChange {
        store_id,
        product_name: product.to_string(),
        units,
        price_per_unit: price,
    }
}

fn supply(store_id: i64, product: &str, units: i64) -> SupplyDraft {
    SupplyDraft {
        store_id,
        product_name: product.to_string(),
        units,
        warehouse_id: 4,
    }
}

fn is_not_authorized(err: &anyhow::Error) -> bool {
    err.downcast_ref::<RetailError>() == Some(&RetailError::NotAuthorized)
}

#[test]
fn customers_are_refused_every_gated_action_without_side_effects() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, CUSTOMER)?;
    let before = snapshot(&conn)?;

    let gate = require_manager(&conn, &session).err().ok_or("gate let a customer in")?;
    assert!(is_not_authorized(&gate));

    let stores = visible_stores(&conn, &session).err().ok_or("stores listed")?;
    assert!(is_not_authorized(&stores));

    let update = update_product(
        &mut conn,
        &session,
        &change(CORNER_MARKET, "Milk", Some(0), None),
    )
    .err()
    .ok_or("update went through")?;
    assert!(is_not_authorized(&update));

    let request = request_supply(&mut conn, &session, &supply(CORNER_MARKET, "Milk", 10))
        .err()
        .ok_or("supply went through")?;
    assert!(is_not_authorized(&request));

    assert_eq!(snapshot(&conn)?, before);
    Ok(())
}

#[test]
fn manager_sees_only_managed_stores_and_admin_sees_all() -> TestResult {
    let conn = seeded()?;

    let manager = session_for(&conn, MANAGER)?;
    let ids: Vec<i64> = visible_stores(&conn, &manager)?.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![CORNER_MARKET, HILLSIDE_GROCERS]);

    let admin = session_for(&conn, ADMIN)?;
    let ids: Vec<i64> = visible_stores(&conn, &admin)?.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![CORNER_MARKET, HILLSIDE_GROCERS, HARBOR_OUTLET]);
    Ok(())
}

#[test]
fn admin_is_recognised_by_role_not_by_id() -> TestResult {
    let mut conn = seeded()?;
    let second_admin = insert_user(
        &conn,
        &NewUser {
            name: "root".to_string(),
            password: "secret".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        },
        Role::Admin,
    )?;
    assert_ne!(second_admin.id, 1);
    let session = log_in(&conn, "root", "secret")?;

    assert_eq!(visible_stores(&conn, &session)?.len(), 3);

    let outcome = update_product(
        &mut conn,
        &session,
        &change(HARBOR_OUTLET, "Bread", Some(5), None),
    )?;
    assert_eq!(outcome.audit, None);
    assert_eq!(row_count(&conn, "ProductUpdates")?, 0);
    Ok(())
}

#[test]
fn padded_role_text_still_counts_as_admin() -> TestResult {
    let conn = seeded()?;
    run_update(
        &conn,
        "INSERT INTO Users (name, password, latitude, longitude, type)
         VALUES ('ops', 'ops', 0.0, 0.0, ' Admin ')",
        [],
    )?;
    let session = log_in(&conn, "ops", "ops")?;

    require_manager(&conn, &session)?;
    assert_eq!(session.user.role, Role::Admin);
    assert_eq!(visible_stores(&conn, &session)?.len(), 3);
    Ok(())
}

#[test]
fn manager_update_writes_exactly_one_audit_row() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, MANAGER)?;

    let outcome = update_product(
        &mut conn,
        &session,
        &change(HILLSIDE_GROCERS, "Coffee", Some(50), Some(11)),
    )?;

    assert_eq!(outcome.before.units, 15);
    assert_eq!(outcome.after.units, 50);
    assert_eq!(outcome.after.price_per_unit, 11);
    assert_eq!(units_of(&conn, HILLSIDE_GROCERS, "Coffee")?, 50);

    let audit = outcome.audit.ok_or("manager update was not audited")?;
    assert_eq!(audit.manager_id, session.user_id());
    assert_eq!(audit.store_id, HILLSIDE_GROCERS);
    assert_eq!(audit.product_name, "Coffee");
    assert_eq!(row_count(&conn, "ProductUpdates")?, 1);
    Ok(())
}

#[test]
fn admin_update_is_not_audited() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, ADMIN)?;

    update_product(
        &mut conn,
        &session,
        &change(CORNER_MARKET, "Apples", None, Some(3)),
    )?;

    let rows = run_query_rows(
        &conn,
        "SELECT numberOfUnits, pricePerUnit FROM Product WHERE storeID = 1 AND productName = 'Apples'",
        [],
    )?;
    assert_eq!(rows.rows, vec![vec!["40".to_string(), "3".to_string()]]);
    assert_eq!(row_count(&conn, "ProductUpdates")?, 0);
    Ok(())
}

#[test]
fn manager_cannot_touch_someone_elses_store() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, MANAGER)?;
    let before = snapshot(&conn)?;

    let err = update_product(
        &mut conn,
        &session,
        &change(HARBOR_OUTLET, "Milk", Some(1), None),
    )
    .err()
    .ok_or("update of a foreign store went through")?;
    assert_eq!(
        err.downcast_ref::<RetailError>(),
        Some(&RetailError::StoreNotVisible(HARBOR_OUTLET))
    );

    let err = request_supply(&mut conn, &session, &supply(HARBOR_OUTLET, "Milk", 5))
        .err()
        .ok_or("supply for a foreign store went through")?;
    assert_eq!(
        err.downcast_ref::<RetailError>(),
        Some(&RetailError::StoreNotVisible(HARBOR_OUTLET))
    );

    assert_eq!(snapshot(&conn)?, before);
    Ok(())
}

#[test]
fn negative_values_are_rejected_before_writing() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, MANAGER)?;
    let before = snapshot(&conn)?;

    let err = update_product(
        &mut conn,
        &session,
        &change(CORNER_MARKET, "Milk", None, Some(-1)),
    )
    .err()
    .ok_or("negative price accepted")?;
    assert!(matches!(
        err.downcast_ref::<RetailError>(),
        Some(RetailError::InvalidInput(_))
    ));
    assert_eq!(snapshot(&conn)?, before);
    Ok(())
}

#[test]
fn supply_request_adds_stock_and_one_request_row() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, MANAGER)?;

    let request = request_supply(&mut conn, &session, &supply(CORNER_MARKET, "Bread", 20))?;

    assert_eq!(units_of(&conn, CORNER_MARKET, "Bread")?, 45);
    assert_eq!(row_count(&conn, "ProductSupplyRequests")?, 1);
    assert_eq!(request.manager_id, session.user_id());
    assert_eq!(request.warehouse_id, 4);
    assert_eq!(request.units_requested, 20);
    assert_eq!(request.product_name, "Bread");
    Ok(())
}

#[test]
fn supply_request_needs_positive_units() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, ADMIN)?;
    let before = snapshot(&conn)?;

    let err = request_supply(&mut conn, &session, &supply(HARBOR_OUTLET, "Bread", 0))
        .err()
        .ok_or("zero-unit supply accepted")?;
    assert_eq!(
        err.downcast_ref::<RetailError>(),
        Some(&RetailError::InvalidQuantity(0))
    );
    assert_eq!(snapshot(&conn)?, before);
    Ok(())
}

#[test]
fn demoted_manager_loses_access_mid_session() -> TestResult {
    let mut conn = seeded()?;
    let session = session_for(&conn, MANAGER)?;
    retail_terminal::db::run_update(
        &conn,
        "UPDATE Users SET type = 'customer' WHERE userID = ?1",
        [session.user_id()],
    )?;

    let err = update_product(
        &mut conn,
        &session,
        &change(CORNER_MARKET, "Milk", Some(1), None),
    )
    .err()
    .ok_or("demoted manager still allowed")?;
    assert!(is_not_authorized(&err));
    Ok(())
}
