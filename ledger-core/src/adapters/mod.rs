//! Adapter implementations (hexagonal architecture)
//!
//! Adapters provide concrete implementations of port traits.

pub mod duckdb;

pub use self::duckdb::DuckDbStore;
