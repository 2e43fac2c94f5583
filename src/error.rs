//! Domain failures the workflows raise on purpose. Database and I/O problems
//! travel as plain `anyhow` errors with context instead; the UI uses
//! `downcast_ref::<RetailError>()` when it needs to tell the two apart.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RetailError {
    #[error("Must be logged in as a manager or administrator to use this function.")]
    NotAuthorized,

    #[error("Cannot request more than {available} units of {product} (you entered: {requested}).")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Quantity must be at least 1 (you entered: {0}).")]
    InvalidQuantity(i64),

    #[error("Store {store_id} has no product named '{product}'.")]
    ProductNotFound { store_id: i64, product: String },

    #[error("Store {0} does not exist.")]
    StoreNotFound(i64),

    #[error("Store {0} is not available to you.")]
    StoreNotVisible(i64),

    #[error("User #{0} no longer exists.")]
    UserNotFound(i64),

    #[error("A user named '{0}' already exists.")]
    DuplicateUser(String),

    #[error("Invalid name or password.")]
    InvalidCredentials,

    #[error("Please log in first.")]
    NotLoggedIn,

    #[error("{0}")]
    InvalidInput(String),
}
