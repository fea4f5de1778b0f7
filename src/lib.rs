pub mod config;
pub mod monitor;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::monitor::{AlertState, NotifyPolicy, PassReport, StockMonitor};
pub use crate::utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
