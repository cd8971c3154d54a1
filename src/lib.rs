pub mod access;
pub mod app;
pub mod branding;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod preferences;
pub mod session;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
