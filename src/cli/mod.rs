pub mod config_cmd;
pub mod metrics_cmd;
pub mod output;
pub mod renderer;
pub mod roi_cmd;
pub mod users_cmd;
