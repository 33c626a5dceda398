pub mod config;
pub mod formatter;
pub mod github;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod roi;
pub mod roster;
pub mod state;
