//! Key/value metadata stored next to the country table.

mod model;

pub use model::MetadataDB;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use log::warn;

use countryxchange_core::Result;

use crate::errors::StorageError;
use crate::schema::metadata;

pub const LAST_REFRESHED_AT_KEY: &str = "last_refreshed_at";

/// Inserts or replaces the value stored under `key`.
pub fn put_value(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
    let row = MetadataDB {
        meta_key: key.to_string(),
        meta_value: Some(value.to_string()),
        updated_at: Some(Utc::now().naive_utc()),
    };
    diesel::insert_into(metadata::table)
        .values(&row)
        .on_conflict(metadata::meta_key)
        .do_update()
        .set((
            metadata::meta_value.eq(excluded(metadata::meta_value)),
            metadata::updated_at.eq(excluded(metadata::updated_at)),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

pub fn get_value(conn: &mut SqliteConnection, key: &str) -> Result<Option<String>> {
    let value = metadata::table
        .filter(metadata::meta_key.eq(key))
        .select(metadata::meta_value)
        .first::<Option<String>>(conn)
        .optional()
        .map_err(StorageError::from)?;
    Ok(value.flatten())
}

pub fn put_last_refreshed_at(conn: &mut SqliteConnection, at: DateTime<Utc>) -> Result<()> {
    put_value(conn, LAST_REFRESHED_AT_KEY, &at.to_rfc3339())
}

/// Parses a stored refresh timestamp. Blank or malformed values read as `None`.
pub fn parse_refreshed_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring unparsable {} value '{}': {}", LAST_REFRESHED_AT_KEY, raw, e);
            None
        }
    }
}
