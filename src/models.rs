//! Domain models that mirror the SQLite schema and get passed throughout the
//! workflows and the TUI. They stay light-weight data holders so the other
//! layers can focus on persistence and presentation.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::error::RetailError;

/// Account type stored in `Users.type`. Privileged actions key off this value
/// rather than any particular user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Manager,
    Admin,
}

impl Role {
    /// Lowercase text persisted in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RetailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(RetailError::InvalidInput(format!("unknown user type '{other}'"))),
        }
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: RetailError| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A row from `Users`.
pub struct User {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub latitude: f64,
    pub longitude: f64,
    pub role: Role,
}

/// Input for the signup form. Signups always become customers.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// A row from `Store`.
pub struct Store {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub manager_id: i64,
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A store that passed the radius filter, paired with its distance from the
/// user so the list view can show it.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStore {
    pub store: Store,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row from `Product`, keyed by store and product name.
pub struct Product {
    pub store_id: i64,
    pub name: String,
    pub units: i64,
    pub price_per_unit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row from `Orders`.
pub struct Order {
    pub number: i64,
    pub customer_id: i64,
    pub store_id: i64,
    pub product_name: String,
    pub units_ordered: i64,
    pub order_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Audit row from `ProductUpdates`, written when a manager edits a product.
pub struct ProductUpdate {
    pub number: i64,
    pub manager_id: i64,
    pub store_id: i64,
    pub product_name: String,
    pub updated_on: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row from `ProductSupplyRequests`.
pub struct SupplyRequest {
    pub number: i64,
    pub manager_id: i64,
    pub warehouse_id: i64,
    pub store_id: i64,
    pub product_name: String,
    pub units_requested: i64,
}

/// The logged-in user. Created by a successful login and handed to every
/// workflow call; dropping it is logging out.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

/// Stringified result set returned by the shim. Column order matches the
/// query; type information is gone once a value is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Customer".parse::<Role>().ok(), Some(Role::Customer));
        assert_eq!(" ADMIN ".parse::<Role>().ok(), Some(Role::Admin));
        assert!("owner".parse::<Role>().is_err());
    }
}
