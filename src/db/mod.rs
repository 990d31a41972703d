//! Database module: pool, schema, row models and repositories.
//!
//! Layout:
//! - `mysql.rs`: pool construction, schema bootstrap, connectivity probe
//! - `schema.rs`: SQL DDL for initializing the database
//! - `models.rs`: Rust structs mirroring DB rows and write payloads
//! - `transactions.rs`, `customers.rs`: CRUD-style repositories
//! - `seed.rs`: development data generators

pub mod customers;
pub mod models;
pub mod mysql;
pub mod schema;
pub mod seed;
pub mod transactions;

pub use customers::CustomersStorage;
pub use mysql::{MySqlPool, connect, connect_lazy, init_schema};
pub use schema::MYSQL_INIT;
pub use transactions::{TransactionFilter, TransactionsStorage};
