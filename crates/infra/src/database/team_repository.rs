//! SQLite-backed internal org mapping (teams and their members).

use std::sync::Arc;

use async_trait::async_trait;
use dealboard_core::ports::TeamDirectory;
use dealboard_domain::{Person, Result, Team};
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::info;

use super::deal_repository::map_join_error;
use super::manager::{map_sql_error, DbManager};

pub struct SqliteTeamDirectory {
    db: Arc<DbManager>,
}

impl SqliteTeamDirectory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert a team with its members, replacing an existing team of the same
    /// id. Used at first run to seed the org mapping.
    pub async fn seed_team(&self, team: Team, members: Vec<(String, Option<i64>)>) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO teams (id, name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                params![team.id, team.name],
            )
            .map_err(map_sql_error)?;
            tx.execute("DELETE FROM team_members WHERE team_id = ?1", params![team.id])
                .map_err(map_sql_error)?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO team_members (team_id, name, crm_user_id) VALUES (?1, ?2, ?3)",
                    )
                    .map_err(map_sql_error)?;
                for (name, crm_user_id) in &members {
                    stmt.execute(params![team.id, name, crm_user_id]).map_err(map_sql_error)?;
                }
            }
            tx.commit().map_err(map_sql_error)?;
            info!(team_id = team.id, members = members.len(), "org team seeded");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl TeamDirectory for SqliteTeamDirectory {
    async fn teams(&self) -> Result<Vec<Team>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Team>> {
            let conn = db.get_connection()?;
            let mut stmt =
                conn.prepare("SELECT id, name FROM teams ORDER BY id").map_err(map_sql_error)?;
            let teams = stmt
                .query_map([], |row| Ok(Team { id: row.get(0)?, name: row.get(1)? }))
                .map_err(map_sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_sql_error)?;
            Ok(teams)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn team(&self, team_id: i64) -> Result<Option<Team>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<Team>> {
            let conn = db.get_connection()?;
            conn.query_row("SELECT id, name FROM teams WHERE id = ?1", params![team_id], |row| {
                Ok(Team { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn members(&self, team_id: i64) -> Result<Vec<Person>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Person>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, team_id, crm_user_id FROM team_members
                     WHERE team_id = ?1 ORDER BY id",
                )
                .map_err(map_sql_error)?;
            let members = stmt
                .query_map(params![team_id], |row| {
                    Ok(Person {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        team_id: row.get(2)?,
                        crm_user_id: row.get(3)?,
                    })
                })
                .map_err(map_sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_sql_error)?;
            Ok(members)
        })
        .await
        .map_err(map_join_error)?
    }
}
