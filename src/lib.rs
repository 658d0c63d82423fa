pub mod app;
pub mod calendar;
pub mod chart;
pub mod errors;
pub mod grid;
pub mod habits;
pub mod handlers;
pub mod html;
pub mod models;
pub mod series;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path};
