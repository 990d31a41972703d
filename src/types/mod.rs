pub mod envelope;
pub mod transactions;

pub use envelope::{ApiResponse, Pagination};
