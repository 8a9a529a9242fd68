mod model;
mod repository;

pub use model::{CountryChangesetDB, CountryDB, NewCountryDB};
pub use repository::{CountryRepository, SqliteCountryWriter};

#[cfg(test)]
mod tests;
