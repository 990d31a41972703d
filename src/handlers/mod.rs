pub mod analytics;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod seed;
pub mod transactions;
