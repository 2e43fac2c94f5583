//! Full-screen menu interface. `App` sequences the workflows; `terminal`
//! owns the raw-mode event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
