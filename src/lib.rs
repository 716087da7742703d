pub mod actions;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod highlight;
pub mod state;
pub mod status;

pub use app::App;
