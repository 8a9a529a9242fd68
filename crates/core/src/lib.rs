//! Domain core for countryxchange: country records, the GDP estimator, record
//! validation and the refresh orchestrator that keeps the local store in sync
//! with the external feeds.
//!
//! This crate performs no I/O of its own. Storage, HTTP sources and the summary
//! renderer plug in through the traits in [`countries`] and [`summary`].

pub mod countries;
pub mod errors;
pub mod refresh;
pub mod summary;

pub use errors::{DatabaseError, Error, Result, Source};
