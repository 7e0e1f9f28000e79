pub mod app;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;
pub mod topics;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_data, persist_data};
