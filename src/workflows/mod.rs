//! Business steps behind each menu entry. Every function takes the
//! connection plus the caller's `Session`, so nothing here depends on UI
//! state and each step can be exercised directly against a database.

mod account;
mod manager;
mod reports;
mod shopping;

pub use account::{create_user, current_user, log_in, parse_new_user};
pub use manager::{
    request_supply, require_manager, update_product, visible_stores, ProductChange,
    ProductChangeOutcome, SupplyDraft, UpdateKind,
};
pub use reports::{
    export_report, prepare_report, run_report, ReportKind, ReportQuery, REPORT_LIMIT,
};
pub use shopping::{check_quantity, nearby_stores, place_order, store_products, OrderRequest};
