pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod stats;
pub mod storage;
pub mod timestamp;
pub mod ui;
pub mod state;
pub mod validate;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use stats::build_chart;
pub use storage::load_data;
