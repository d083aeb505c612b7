pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod figure;
pub mod price_data;
pub mod signal;

pub mod utils;
pub use utils::{file_logger, local_now, stderr_logger};
