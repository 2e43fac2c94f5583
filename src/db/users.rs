use anyhow::{Context, Result};
use rusqlite::{ffi, params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row};

use crate::error::RetailError;
use crate::models::{NewUser, Role, User};

const USER_COLUMNS: &str = "userID, name, password, latitude, longitude, type";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        role: row.get(5)?,
    })
}

/// Insert a user with the given role and return the hydrated row.
pub fn insert_user(conn: &Connection, new_user: &NewUser, role: Role) -> Result<User> {
    conn.execute(
        "INSERT INTO Users (name, password, latitude, longitude, type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_user.name,
            new_user.password,
            new_user.latitude,
            new_user.longitude,
            role
        ],
    )
    .map_err(|err| map_unique_name(err, &new_user.name))
    .context("failed to insert user")?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: new_user.name.clone(),
        password: new_user.password.clone(),
        latitude: new_user.latitude,
        longitude: new_user.longitude,
        role,
    })
}

/// Look up the user whose name and password both match.
pub fn find_by_credentials(conn: &Connection, name: &str, password: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM Users WHERE name = ?1 AND password = ?2"),
        params![name, password],
        user_from_row,
    )
    .optional()
    .context("failed to look up credentials")
}

pub fn fetch_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM Users WHERE userID = ?1"),
        [id],
        user_from_row,
    )
    .optional()
    .context("failed to load user")
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM Users", [], |row| row.get(0))
        .context("failed to count users")
}

/// Only the UNIQUE index on `name` means the name is taken; NOT NULL and
/// foreign key failures keep their own message.
fn map_unique_name(err: SqlError, name: &str) -> anyhow::Error {
    match &err {
        SqlError::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RetailError::DuplicateUser(name.to_string()).into()
        }
        _ => err.into(),
    }
}
