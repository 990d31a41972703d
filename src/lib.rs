pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod period;
pub mod router;
pub mod types;

pub use error::DashboardError;
