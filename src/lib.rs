pub mod app;
pub mod calendar;
pub mod config;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod panels;
pub mod recommendations;
pub mod recorder;
pub mod refresh;
pub mod series;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use date_key::DateKey;
pub use state::AppState;
pub use storage::{JsonFileStore, RecordStore};
