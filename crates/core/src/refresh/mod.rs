//! Synchronization of the local store with the country directory and rate feeds.

mod gdp;
mod refresh_model;
mod refresh_service;

pub use gdp::*;
pub use refresh_model::*;
pub use refresh_service::*;
