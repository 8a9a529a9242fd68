//! Country records, their validation rules and persistence contracts.

mod countries_model;
mod countries_traits;
mod validation;

pub use countries_model::*;
pub use countries_traits::*;
pub use validation::{validate, ValidationError};
