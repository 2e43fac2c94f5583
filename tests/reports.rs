mod common;

use std::fs;

use rusqlite::Connection;
use testresult::TestResult;

use retail_terminal::models::Session;
use retail_terminal::workflows::{
    export_report, place_order, prepare_report, run_report, OrderRequest, ReportKind,
    REPORT_LIMIT,
};
use retail_terminal::RetailError;

use common::{
    seeded, session_for, snapshot, ADMIN, CORNER_MARKET, CUSTOMER, HARBOR_OUTLET,
    HILLSIDE_GROCERS, MANAGER,
};

const GATED: [ReportKind; 5] = [
    ReportKind::RecentStoreOrders,
    ReportKind::RecentProductUpdates,
    ReportKind::PopularProducts,
    ReportKind::PopularCustomers,
    ReportKind::SupplyRequests,
];

fn order(conn: &mut Connection, session: &Session, store_id: i64, product: &str, units: i64) -> anyhow::Result<()> {
    place_order(
        conn,
        session,
        &OrderRequest {
            store_id,
            product_name: product.to_string(),
            units,
        },
    )?;
    Ok(())
}

/// Alice buys from both of the manager's stores, the admin from the harbor.
fn with_orders() -> anyhow::Result<Connection> {
    let mut conn = seeded()?;
    let alice = session_for(&conn, CUSTOMER)?;
    let admin = session_for(&conn, ADMIN)?;

    order(&mut conn, &alice, CORNER_MARKET, "Apples", 2)?;
    order(&mut conn, &alice, CORNER_MARKET, "Milk", 1)?;
    order(&mut conn, &alice, HILLSIDE_GROCERS, "Apples", 5)?;
    order(&mut conn, &admin, HARBOR_OUTLET, "Coffee", 9)?;
    Ok(conn)
}

fn column<'a>(result: &'a retail_terminal::models::QueryResult, name: &str) -> Vec<&'a str> {
    let index = result
        .columns
        .iter()
        .position(|column| column == name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    result.rows.iter().map(|row| row[index].as_str()).collect()
}

#[test]
fn customers_cannot_open_gated_reports() -> TestResult {
    let conn = with_orders()?;
    let session = session_for(&conn, CUSTOMER)?;

    for kind in GATED {
        let err = run_report(&conn, &session, kind).err().ok_or("report was not gated")?;
        assert_eq!(
            err.downcast_ref::<RetailError>(),
            Some(&RetailError::NotAuthorized),
            "{kind:?}"
        );
    }
    Ok(())
}

#[test]
fn own_orders_are_listed_newest_first() -> TestResult {
    let conn = with_orders()?;
    let session = session_for(&conn, CUSTOMER)?;

    let result = run_report(&conn, &session, ReportKind::MyRecentOrders)?;

    assert_eq!(column(&result, "orderNumber"), vec!["3", "2", "1"]);
    assert_eq!(
        column(&result, "storeName"),
        vec!["Hillside Grocers", "Corner Market", "Corner Market"]
    );
    Ok(())
}

#[test]
fn manager_store_orders_cover_only_managed_stores() -> TestResult {
    let conn = with_orders()?;

    let manager = session_for(&conn, MANAGER)?;
    let result = run_report(&conn, &manager, ReportKind::RecentStoreOrders)?;
    assert_eq!(column(&result, "orderNumber"), vec!["3", "2", "1"]);

    let admin = session_for(&conn, ADMIN)?;
    let result = run_report(&conn, &admin, ReportKind::RecentStoreOrders)?;
    assert_eq!(column(&result, "orderNumber"), vec!["4", "3", "2", "1"]);
    Ok(())
}

#[test]
fn recent_reports_stop_at_five_rows() -> TestResult {
    let mut conn = seeded()?;
    let alice = session_for(&conn, CUSTOMER)?;
    for _ in 0..7 {
        order(&mut conn, &alice, CORNER_MARKET, "Bread", 1)?;
    }
    let manager = session_for(&conn, MANAGER)?;

    let result = run_report(&conn, &manager, ReportKind::RecentStoreOrders)?;
    assert_eq!(result.len() as i64, REPORT_LIMIT);
    assert_eq!(column(&result, "orderNumber"), vec!["7", "6", "5", "4", "3"]);

    let own = run_report(&conn, &alice, ReportKind::MyRecentOrders)?;
    assert_eq!(own.len() as i64, REPORT_LIMIT);
    Ok(())
}

#[test]
fn popular_products_count_orders() -> TestResult {
    let conn = with_orders()?;
    let admin = session_for(&conn, ADMIN)?;

    let result = run_report(&conn, &admin, ReportKind::PopularProducts)?;

    assert_eq!(column(&result, "productName"), vec!["Apples", "Coffee", "Milk"]);
    assert_eq!(column(&result, "totalOrders"), vec!["2", "1", "1"]);
    Ok(())
}

#[test]
fn popular_customers_sum_units() -> TestResult {
    let conn = with_orders()?;

    let admin = session_for(&conn, ADMIN)?;
    let result = run_report(&conn, &admin, ReportKind::PopularCustomers)?;
    assert_eq!(column(&result, "name"), vec!["admin", "alice"]);
    assert_eq!(column(&result, "totalUnits"), vec!["9", "8"]);

    // The manager only counts purchases made in their stores.
    let manager = session_for(&conn, MANAGER)?;
    let result = run_report(&conn, &manager, ReportKind::PopularCustomers)?;
    assert_eq!(column(&result, "name"), vec!["alice"]);
    Ok(())
}

#[test]
fn store_product_list_is_open_to_everyone() -> TestResult {
    let conn = seeded()?;
    let session = session_for(&conn, CUSTOMER)?;

    let result = run_report(&conn, &session, ReportKind::StoreProducts(HARBOR_OUTLET))?;
    assert_eq!(result.columns, vec!["storeID", "productName", "numberOfUnits", "pricePerUnit"]);
    assert_eq!(result.len(), 4);

    let err = run_report(&conn, &session, ReportKind::StoreProducts(42))
        .err()
        .ok_or("unknown store listed")?;
    assert_eq!(
        err.downcast_ref::<RetailError>(),
        Some(&RetailError::StoreNotFound(42))
    );
    Ok(())
}

#[test]
fn reports_never_change_any_table() -> TestResult {
    let conn = with_orders()?;
    let before = snapshot(&conn)?;

    for name in [ADMIN, MANAGER, CUSTOMER] {
        let session = session_for(&conn, name)?;
        run_report(&conn, &session, ReportKind::MyRecentOrders)?;
        run_report(&conn, &session, ReportKind::StoreProducts(CORNER_MARKET))?;
        for kind in GATED {
            // Customers are refused; the refusal must not write either.
            let _ = run_report(&conn, &session, kind);
        }
    }

    assert_eq!(snapshot(&conn)?, before);
    Ok(())
}

#[test]
fn export_writes_numbered_tsv_files() -> TestResult {
    let conn = with_orders()?;
    let session = session_for(&conn, ADMIN)?;
    let dir = tempfile::tempdir()?;
    let exports = dir.path().join("exports");

    let query = prepare_report(&conn, &session, ReportKind::PopularProducts)?;
    let (first, rows) = export_report(&conn, &query, &exports)?;
    let (second, _) = export_report(&conn, &query, &exports)?;

    assert_eq!(rows, 3);
    assert_eq!(first, exports.join("popular-products-1.tsv"));
    assert_eq!(second, exports.join("popular-products-2.tsv"));

    let contents = fs::read_to_string(&first)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "productName\ttotalOrders");
    assert_eq!(lines[1], "Apples\t2");
    assert_eq!(lines.len(), 4);
    Ok(())
}

#[test]
fn export_skips_files_already_on_disk() -> TestResult {
    let conn = with_orders()?;
    let session = session_for(&conn, ADMIN)?;
    let dir = tempfile::tempdir()?;
    let exports = dir.path().join("exports");
    fs::create_dir_all(&exports)?;
    let kept = exports.join("popular-products-1.tsv");
    fs::write(&kept, "hand edited\n")?;

    let query = prepare_report(&conn, &session, ReportKind::PopularProducts)?;
    let (path, _) = export_report(&conn, &query, &exports)?;

    assert_eq!(path, exports.join("popular-products-2.tsv"));
    assert_eq!(fs::read_to_string(&kept)?, "hand edited\n");
    Ok(())
}
