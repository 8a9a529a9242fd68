use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::{debug, info};

use countryxchange_core::countries::{
    fold_key, Country, CountryFilter, CountryRepositoryTrait, CountrySort, CountryWriter,
    NewCountry, RefreshJob,
};
use countryxchange_core::{Error, Result};

use super::model::{CountryChangesetDB, CountryDB, NewCountryDB};
use crate::db::{apply_migrations, get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::metadata;
use crate::schema::countries;

const DROP_ALL_SQL: &str = "\
    DROP TABLE IF EXISTS metadata;\
    DROP TABLE IF EXISTS countries;\
    DROP TABLE IF EXISTS __diesel_schema_migrations;";

pub struct CountryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CountryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CountryRepository { pool, writer }
    }
}

/// Writes issued from inside a refresh transaction.
pub struct SqliteCountryWriter<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteCountryWriter<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl CountryWriter for SqliteCountryWriter<'_> {
    fn upsert_country(&mut self, country: &NewCountry) -> Result<()> {
        let row = NewCountryDB::from(country);
        let changes = CountryChangesetDB::from(&row);
        diesel::insert_into(countries::table)
            .values(&row)
            .on_conflict(countries::name_key)
            .do_update()
            .set(&changes)
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn set_last_refreshed_at(&mut self, at: DateTime<Utc>) -> Result<()> {
        metadata::put_last_refreshed_at(self.conn, at)
    }
}

fn is_missing_table(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(_, info) if info.message().starts_with("no such table")
    )
}

#[async_trait]
impl CountryRepositoryTrait for CountryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        self.writer
            .exec(|conn: &mut SqliteConnection| -> Result<()> { apply_migrations(conn) })
            .await
    }

    async fn run_refresh_transaction(&self, job: RefreshJob) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut writer = SqliteCountryWriter::new(conn);
                job(&mut writer)
            })
            .await
    }

    fn list_countries(&self, filter: &CountryFilter) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = countries::table.into_boxed();
        if let Some(region) = &filter.region {
            query = query.filter(countries::region_key.eq(fold_key(region)));
        }
        if let Some(currency) = &filter.currency {
            query = query.filter(countries::currency_key.eq(fold_key(currency)));
        }
        query = match filter.sort {
            CountrySort::GdpDesc => query
                .order_by(countries::estimated_gdp.is_null().asc())
                .then_order_by(countries::estimated_gdp.desc())
                .then_order_by(countries::id.asc()),
            CountrySort::GdpAsc => query
                .order_by(countries::estimated_gdp.is_null().asc())
                .then_order_by(countries::estimated_gdp.asc())
                .then_order_by(countries::id.asc()),
            CountrySort::Unordered => query.order_by(countries::id.asc()),
        };

        let rows = query
            .select(CountryDB::as_select())
            .load::<CountryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    fn get_country(&self, name: &str) -> Result<Country> {
        let mut conn = get_connection(&self.pool)?;
        let row = countries::table
            .filter(countries::name_key.eq(fold_key(name)))
            .select(CountryDB::as_select())
            .first::<CountryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(Country::from)
            .ok_or_else(|| Error::not_found(format!("country '{}'", name.trim())))
    }

    async fn delete_country(&self, name: &str) -> Result<bool> {
        let target = fold_key(name);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let affected = diesel::delete(countries::table.filter(countries::name_key.eq(target.as_str())))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected > 0 {
                    debug!("Deleted country '{}'", target);
                }
                Ok(affected > 0)
            })
            .await
    }

    fn count_countries(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let total = countries::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total)
    }

    fn get_last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;
        let raw = match metadata::get_value(&mut conn, metadata::LAST_REFRESHED_AT_KEY) {
            Ok(raw) => raw,
            Err(Error::Database(_)) if !metadata_table_exists(&mut conn)? => None,
            Err(e) => return Err(e),
        };
        Ok(metadata::parse_refreshed_at(raw.as_deref()))
    }

    fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<Country>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = countries::table
            .filter(countries::estimated_gdp.is_not_null())
            .order_by(countries::estimated_gdp.desc())
            .then_order_by(countries::id.asc())
            .limit(limit)
            .select(CountryDB::as_select())
            .load::<CountryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn drop_tables(&self) -> Result<()> {
        self.writer
            .exec(|conn: &mut SqliteConnection| -> Result<()> {
                conn.batch_execute(DROP_ALL_SQL)
                    .map_err(StorageError::from)?;
                apply_migrations(conn)
            })
            .await?;
        info!("Dropped and re-created country tables");
        Ok(())
    }
}

fn metadata_table_exists(conn: &mut SqliteConnection) -> Result<bool> {
    match diesel::sql_query("SELECT 1 FROM metadata LIMIT 0").execute(conn) {
        Ok(_) => Ok(true),
        Err(e) if is_missing_table(&e) => Ok(false),
        Err(e) => Err(StorageError::from(e).into()),
    }
}
