use anyhow::Result;
use rusqlite::Connection;

use crate::db::{fetch_user, find_by_credentials, insert_user};
use crate::error::RetailError;
use crate::models::{NewUser, Role, Session, User};

/// Validate raw signup input. Coordinates must parse as finite numbers.
pub fn parse_new_user(
    name: &str,
    password: &str,
    latitude: &str,
    longitude: &str,
) -> Result<NewUser, RetailError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RetailError::InvalidInput("Name is required.".to_string()));
    }
    if password.is_empty() {
        return Err(RetailError::InvalidInput("Password is required.".to_string()));
    }

    Ok(NewUser {
        name: name.to_string(),
        password: password.to_string(),
        latitude: parse_coordinate("Latitude", latitude)?,
        longitude: parse_coordinate("Longitude", longitude)?,
    })
}

fn parse_coordinate(label: &str, raw: &str) -> Result<f64, RetailError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RetailError::InvalidInput(format!("{label} must be a number."))),
    }
}

/// Sign up a new customer. Every self-service account starts as a customer;
/// managers and admins are provisioned directly in the database.
pub fn create_user(conn: &Connection, new_user: &NewUser) -> Result<User> {
    let user = insert_user(conn, new_user, Role::Customer)?;
    log::info!("created user #{} ({})", user.id, user.name);
    Ok(user)
}

/// Check credentials and open a session for the matching user.
pub fn log_in(conn: &Connection, name: &str, password: &str) -> Result<Session> {
    match find_by_credentials(conn, name.trim(), password)? {
        Some(user) => {
            log::info!("user #{} ({}) logged in as {}", user.id, user.name, user.role);
            Ok(Session::new(user))
        }
        None => {
            log::warn!("failed login attempt for '{}'", name.trim());
            Err(RetailError::InvalidCredentials.into())
        }
    }
}

/// Re-read the session's user row. Location and role are always taken from
/// the database so edits made elsewhere apply without logging out.
pub fn current_user(conn: &Connection, session: &Session) -> Result<User> {
    fetch_user(conn, session.user_id())?
        .ok_or_else(|| RetailError::UserNotFound(session.user_id()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_input_is_trimmed_and_parsed() {
        let parsed = parse_new_user("  bob ", "pw", " 12.5", "40").ok();
        let parsed = parsed.map(|user| (user.name, user.latitude, user.longitude));
        assert_eq!(parsed, Some(("bob".to_string(), 12.5, 40.0)));
    }

    #[test]
    fn signup_rejects_bad_coordinates() {
        let err = parse_new_user("bob", "pw", "north", "1").err();
        assert_eq!(
            err,
            Some(RetailError::InvalidInput("Latitude must be a number.".to_string()))
        );
        assert!(parse_new_user("bob", "pw", "1", "NaN").is_err());
    }

    #[test]
    fn signup_requires_name_and_password() {
        assert!(parse_new_user("   ", "pw", "1", "1").is_err());
        assert!(parse_new_user("bob", "", "1", "1").is_err());
    }
}
