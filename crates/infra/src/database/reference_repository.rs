//! SQLite-backed storage for cached upstream reference data.

use std::sync::Arc;

use async_trait::async_trait;
use dealboard_core::ports::ReferenceRepository;
use dealboard_domain::{CrmUser, FieldOption, Result};
use rusqlite::params;
use tokio::task;

use super::deal_repository::map_join_error;
use super::manager::{map_sql_error, DbManager};

pub struct SqliteReferenceRepository {
    db: Arc<DbManager>,
}

impl SqliteReferenceRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReferenceRepository for SqliteReferenceRepository {
    async fn replace_users(&self, users: &[CrmUser]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let users = users.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM crm_users", []).map_err(map_sql_error)?;
            {
                let mut stmt = tx
                    .prepare("INSERT INTO crm_users (id, name, email, active) VALUES (?1, ?2, ?3, ?4)")
                    .map_err(map_sql_error)?;
                for user in &users {
                    stmt.execute(params![user.id, user.name, user.email, user.active as i64])
                        .map_err(map_sql_error)?;
                }
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_users(&self) -> Result<Vec<CrmUser>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<CrmUser>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT id, name, email, active FROM crm_users ORDER BY id")
                .map_err(map_sql_error)?;
            let users = stmt
                .query_map([], |row| {
                    Ok(CrmUser {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        active: row.get::<_, i64>(3)? != 0,
                    })
                })
                .map_err(map_sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_sql_error)?;
            Ok(users)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn replace_field_options(&self, field: &str, options: &[FieldOption]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let field = field.to_string();
        let options = options.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM field_options WHERE field = ?1", params![field])
                .map_err(map_sql_error)?;
            {
                let mut stmt = tx
                    .prepare("INSERT INTO field_options (field, code, label) VALUES (?1, ?2, ?3)")
                    .map_err(map_sql_error)?;
                for option in &options {
                    stmt.execute(params![field, option.code, option.label])
                        .map_err(map_sql_error)?;
                }
            }
            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_field_options(&self, field: &str) -> Result<Vec<FieldOption>> {
        let db = Arc::clone(&self.db);
        let field = field.to_string();

        task::spawn_blocking(move || -> Result<Vec<FieldOption>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT code, label FROM field_options WHERE field = ?1 ORDER BY code")
                .map_err(map_sql_error)?;
            let options = stmt
                .query_map(params![field], |row| {
                    Ok(FieldOption { code: row.get(0)?, label: row.get(1)? })
                })
                .map_err(map_sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_sql_error)?;
            Ok(options)
        })
        .await
        .map_err(map_join_error)?
    }
}
