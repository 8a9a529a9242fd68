use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(primary_key(meta_key))]
#[diesel(table_name = crate::schema::metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MetadataDB {
    pub meta_key: String,
    pub meta_value: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}
