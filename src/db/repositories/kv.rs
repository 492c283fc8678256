use crate::entities::{kv_entries, prelude::*};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

/// Repository for raw key-value rows
pub struct KvRepository {
    conn: DatabaseConnection,
}

impl KvRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DbErr> {
        let row = KvEntries::find_by_id(key.to_string())
            .one(&self.conn)
            .await?;
        Ok(row.map(|r| r.value))
    }

    /// Inserts or overwrites the row for `key`.
    pub async fn put(&self, key: &str, value: String) -> Result<(), DbErr> {
        let active_model = kv_entries::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        KvEntries::insert(active_model)
            .on_conflict(
                OnConflict::column(kv_entries::Column::Key)
                    .update_columns([kv_entries::Column::Value, kv_entries::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool, DbErr> {
        let res = KvEntries::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
