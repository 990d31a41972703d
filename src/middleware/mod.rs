pub mod customer_scope;

pub use customer_scope::CustomerScope;
