//! Persistence module split across logical submodules. `shim` is the generic
//! statement layer; the rest wrap one table each.

mod connection;
mod orders;
mod products;
mod seed;
pub mod shim;
mod stores;
mod supply;
mod updates;
mod users;

pub use connection::{ensure_schema, open_database, open_in_memory};
pub use orders::{fetch_order, insert_order};
pub use products::{
    decrement_stock, fetch_product, fetch_products_for_store, increment_stock, insert_product,
    set_units_and_price,
};
pub use seed::seed_demo_data;
pub use shim::{
    current_sequence_value, run_query_count, run_query_print, run_query_rows, run_update,
};
pub use stores::{fetch_managed_stores, fetch_store, fetch_stores, insert_store};
pub use supply::{fetch_supply_request, insert_supply_request};
pub use updates::{fetch_product_update, insert_product_update};
pub use users::{count_users, fetch_user, find_by_credentials, insert_user};
