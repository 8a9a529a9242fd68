//! Database models for the countries table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use countryxchange_core::countries::{fold_key, Country, NewCountry};

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CountryDB {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
pub struct NewCountryDB {
    pub name: String,
    pub name_key: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub region_key: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub currency_key: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

/// Columns overwritten when a refresh meets an existing name key. The stored
/// name and id are left alone; `None` clears the column.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(treat_none_as_null = true)]
pub struct CountryChangesetDB {
    pub capital: Option<String>,
    pub region: Option<String>,
    pub region_key: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub currency_key: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

impl From<CountryDB> for Country {
    fn from(db: CountryDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            capital: db.capital,
            region: db.region,
            population: db.population,
            currency_code: db.currency_code,
            exchange_rate: db.exchange_rate,
            estimated_gdp: db.estimated_gdp,
            flag_url: db.flag_url,
            last_refreshed_at: db.last_refreshed_at.and_utc(),
        }
    }
}

impl From<&NewCountry> for NewCountryDB {
    fn from(domain: &NewCountry) -> Self {
        Self {
            name: domain.name.trim().to_string(),
            name_key: fold_key(&domain.name),
            capital: domain.capital.clone(),
            region: domain.region.clone(),
            region_key: domain.region.as_deref().map(fold_key),
            population: domain.population,
            currency_code: domain.currency_code.clone(),
            currency_key: domain.currency_code.as_deref().map(fold_key),
            exchange_rate: domain.exchange_rate,
            estimated_gdp: domain.estimated_gdp,
            flag_url: domain.flag_url.clone(),
            last_refreshed_at: domain.last_refreshed_at.naive_utc(),
        }
    }
}

impl From<&NewCountryDB> for CountryChangesetDB {
    fn from(row: &NewCountryDB) -> Self {
        Self {
            capital: row.capital.clone(),
            region: row.region.clone(),
            region_key: row.region_key.clone(),
            population: row.population,
            currency_code: row.currency_code.clone(),
            currency_key: row.currency_key.clone(),
            exchange_rate: row.exchange_rate,
            estimated_gdp: row.estimated_gdp,
            flag_url: row.flag_url.clone(),
            last_refreshed_at: row.last_refreshed_at,
        }
    }
}
