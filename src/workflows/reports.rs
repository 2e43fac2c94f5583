//! Read-only listings. A report is prepared into a `ReportQuery` (after the
//! role gate where one applies) so the UI can both display it and export it
//! without rebuilding the statement.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::Connection;

use super::manager::require_manager;
use crate::db::{fetch_store, run_query_print, run_query_rows};
use crate::error::RetailError;
use crate::models::{QueryResult, Session};

/// How many rows the "recent" and "popular" listings show.
pub const REPORT_LIMIT: i64 = 5;

/// Stores the acting user (bound as `?1`) may see: all of them for an admin,
/// otherwise only the ones they manage. Expects `Store S` and `Users U` in the
/// FROM clause.
const VISIBLE_STORE_SCOPE: &str = "(LOWER(TRIM(U.type)) = 'admin' OR S.managerID = U.userID)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// The logged-in user's own latest orders.
    MyRecentOrders,
    /// Product list of one store.
    StoreProducts(i64),
    RecentStoreOrders,
    RecentProductUpdates,
    PopularProducts,
    PopularCustomers,
    SupplyRequests,
}

impl ReportKind {
    pub fn requires_manager(self) -> bool {
        !matches!(self, ReportKind::MyRecentOrders | ReportKind::StoreProducts(_))
    }

    pub fn title(self) -> String {
        match self {
            ReportKind::MyRecentOrders => format!("Your {REPORT_LIMIT} Most Recent Orders"),
            ReportKind::StoreProducts(id) => format!("Products at Store {id}"),
            ReportKind::RecentStoreOrders => format!("{REPORT_LIMIT} Most Recent Store Orders"),
            ReportKind::RecentProductUpdates => {
                format!("{REPORT_LIMIT} Most Recent Product Updates")
            }
            ReportKind::PopularProducts => format!("{REPORT_LIMIT} Most Popular Products"),
            ReportKind::PopularCustomers => format!("{REPORT_LIMIT} Most Popular Customers"),
            ReportKind::SupplyRequests => format!("{REPORT_LIMIT} Most Recent Supply Requests"),
        }
    }

    /// File-name friendly identifier used for exports.
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::MyRecentOrders => "my-recent-orders",
            ReportKind::StoreProducts(_) => "store-products",
            ReportKind::RecentStoreOrders => "recent-store-orders",
            ReportKind::RecentProductUpdates => "recent-product-updates",
            ReportKind::PopularProducts => "popular-products",
            ReportKind::PopularCustomers => "popular-customers",
            ReportKind::SupplyRequests => "supply-requests",
        }
    }
}

/// A ready-to-run report statement with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub sql: String,
    pub params: Vec<Value>,
}

impl ReportQuery {
    pub fn run(&self, conn: &Connection) -> Result<QueryResult> {
        run_query_rows(conn, &self.sql, params_from_iter(self.params.iter()))
    }

    /// Tab-separated dump of the report, header first. Returns the row count.
    pub fn export<W: Write>(&self, conn: &Connection, out: &mut W) -> Result<usize> {
        run_query_print(conn, &self.sql, params_from_iter(self.params.iter()), out)
    }
}

/// Write `query` to the first free `<slug>-<n>.tsv` in `dir`, creating the
/// directory when needed. Returns the file and the number of rows written.
pub fn export_report(conn: &Connection, query: &ReportQuery, dir: &Path) -> Result<(PathBuf, usize)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let slug = query.kind.slug();
    let (path, file) = create_numbered(dir, slug)?;
    let mut out = BufWriter::new(file);
    let rows = query.export(conn, &mut out)?;
    out.flush().context("failed to flush export file")?;

    info!("exported {rows} row(s) of {slug} to {}", path.display());
    Ok((path, rows))
}

/// Claim the first `<slug>-<n>.tsv` that does not exist yet. Existing files
/// are never opened for writing.
fn create_numbered(dir: &Path, slug: &str) -> Result<(PathBuf, File)> {
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{slug}-{n}.tsv"));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to create export file {}", candidate.display())
                })
            }
        }
    }
}

/// Gate (when the report needs it) and build the statement for `kind`.
pub fn prepare_report(conn: &Connection, session: &Session, kind: ReportKind) -> Result<ReportQuery> {
    if kind.requires_manager() {
        require_manager(conn, session)?;
    }

    let user_id = Value::Integer(session.user_id());
    let (sql, params) = match kind {
        ReportKind::MyRecentOrders => (
            format!(
                "SELECT O.orderNumber, O.storeID, S.name AS storeName, O.productName,
                        O.unitsOrdered, O.orderTime
                 FROM Orders O
                 JOIN Store S ON S.storeID = O.storeID
                 WHERE O.customerID = ?1
                 ORDER BY O.orderTime DESC, O.orderNumber DESC
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
        ReportKind::StoreProducts(store_id) => {
            if fetch_store(conn, store_id)?.is_none() {
                return Err(RetailError::StoreNotFound(store_id).into());
            }
            (
                "SELECT storeID, productName, numberOfUnits, pricePerUnit
                 FROM Product
                 WHERE storeID = ?1
                 ORDER BY productName COLLATE NOCASE"
                    .to_string(),
                vec![Value::Integer(store_id)],
            )
        }
        ReportKind::RecentStoreOrders => (
            format!(
                "SELECT O.orderNumber, S.name AS storeName, C.name AS customerName,
                        O.productName, O.unitsOrdered, O.orderTime
                 FROM Orders O
                 JOIN Store S ON S.storeID = O.storeID
                 JOIN Users C ON C.userID = O.customerID
                 JOIN Users U ON U.userID = ?1
                 WHERE {VISIBLE_STORE_SCOPE}
                 ORDER BY O.orderTime DESC, O.orderNumber DESC
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
        ReportKind::RecentProductUpdates => (
            format!(
                "SELECT P.updateNumber, P.managerID, P.storeID, P.productName, P.updatedOn
                 FROM ProductUpdates P
                 JOIN Store S ON S.storeID = P.storeID
                 JOIN Users U ON U.userID = ?1
                 WHERE {VISIBLE_STORE_SCOPE}
                 ORDER BY P.updatedOn DESC, P.updateNumber DESC
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
        ReportKind::PopularProducts => (
            format!(
                "SELECT O.productName, COUNT(*) AS totalOrders
                 FROM Orders O
                 JOIN Store S ON S.storeID = O.storeID
                 JOIN Users U ON U.userID = ?1
                 WHERE {VISIBLE_STORE_SCOPE}
                 GROUP BY O.productName
                 ORDER BY totalOrders DESC, O.productName
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
        ReportKind::PopularCustomers => (
            format!(
                "SELECT C.userID, C.name, SUM(O.unitsOrdered) AS totalUnits
                 FROM Orders O
                 JOIN Users C ON C.userID = O.customerID
                 JOIN Store S ON S.storeID = O.storeID
                 JOIN Users U ON U.userID = ?1
                 WHERE {VISIBLE_STORE_SCOPE}
                 GROUP BY C.userID, C.name
                 ORDER BY totalUnits DESC, C.userID
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
        ReportKind::SupplyRequests => (
            format!(
                "SELECT R.requestNumber, R.managerID, R.warehouseID, R.storeID,
                        R.productName, R.unitsRequested
                 FROM ProductSupplyRequests R
                 JOIN Store S ON S.storeID = R.storeID
                 JOIN Users U ON U.userID = ?1
                 WHERE {VISIBLE_STORE_SCOPE}
                 ORDER BY R.requestNumber DESC
                 LIMIT {REPORT_LIMIT}"
            ),
            vec![user_id],
        ),
    };

    Ok(ReportQuery { kind, sql, params })
}

/// Gate, build, and run in one go.
pub fn run_report(conn: &Connection, session: &Session, kind: ReportKind) -> Result<QueryResult> {
    prepare_report(conn, session, kind)?.run(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_listings_are_ungated() {
        assert!(!ReportKind::MyRecentOrders.requires_manager());
        assert!(!ReportKind::StoreProducts(3).requires_manager());
        assert!(ReportKind::PopularCustomers.requires_manager());
        assert!(ReportKind::SupplyRequests.requires_manager());
    }

    #[test]
    fn titles_mention_the_limit() {
        assert_eq!(ReportKind::PopularProducts.title(), "5 Most Popular Products");
        assert_eq!(ReportKind::StoreProducts(3).title(), "Products at Store 3");
    }
}
