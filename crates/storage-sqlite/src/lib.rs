//! SQLite persistence for countryxchange, built on diesel.
//!
//! Reads go through an r2d2 pool; every write is funneled through a single
//! writer thread (see [`db::write_actor`]) and runs in its own transaction.

pub mod countries;
pub mod db;
pub mod errors;
pub mod metadata;
pub mod schema;

pub use countries::CountryRepository;
pub use db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
