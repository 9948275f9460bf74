pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod marketplace;
pub mod records;
pub mod state;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
