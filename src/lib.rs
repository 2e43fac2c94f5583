//! Menu-driven retail client over a single SQLite connection: customers find
//! nearby stores and place orders, managers and admins maintain stock and read
//! the recent-activity reports.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod nearby;
pub mod ui;
pub mod workflows;

/// Start-up pieces used by `main.rs`.
pub use config::{AppConfig, Cli};
pub use db::{open_database, open_in_memory, seed_demo_data};
pub use logging::init_logging;

pub use error::RetailError;
pub use models::{Role, Session};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
