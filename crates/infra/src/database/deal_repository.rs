//! SQLite-backed deal snapshot repository.
//!
//! `replace_all` implements the full-replace contract: one transaction
//! deleting the current snapshot and inserting the new rows in batches, so
//! readers either see the prior snapshot or the complete new one. All
//! database operations run in `spawn_blocking` to avoid blocking the async
//! runtime.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use dealboard_core::ports::DealRepository;
use dealboard_domain::constants::INSERT_BATCH_SIZE;
use dealboard_domain::{Deal, DealStatus, DealboardError, Result};
use rusqlite::{params_from_iter, Row, ToSql};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};

const DEAL_COLUMNS: &str = "id, title, value, currency, status, stage_id, pipeline_id, \
     user_id, creator_user_id, add_time, won_time, lost_time, deal_type, country, origin, \
     employee_count, sales_cycle_days";
const COLUMNS_PER_DEAL: usize = 17;

pub struct SqliteDealRepository {
    db: Arc<DbManager>,
}

impl SqliteDealRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealRepository for SqliteDealRepository {
    async fn replace_all(&self, deals: &[Deal]) -> Result<usize> {
        let db = Arc::clone(&self.db);
        let deals = deals.to_vec();

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            tx.execute("DELETE FROM deals", []).map_err(map_sql_error)?;
            for chunk in deals.chunks(INSERT_BATCH_SIZE) {
                insert_batch(&tx, chunk)?;
            }

            tx.commit().map_err(map_sql_error)?;
            debug!(rows = deals.len(), "deal snapshot replaced");
            Ok(deals.len())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_all(&self) -> Result<Vec<Deal>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Deal>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("SELECT {DEAL_COLUMNS} FROM deals"))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], deal_from_row)
                .map_err(map_sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count(&self) -> Result<i64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<i64> {
            let conn = db.get_connection()?;
            conn.query_row("SELECT COUNT(*) FROM deals", [], |row| row.get(0))
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_batch(tx: &rusqlite::Transaction<'_>, deals: &[Deal]) -> Result<()> {
    if deals.is_empty() {
        return Ok(());
    }

    let placeholders: Vec<String> = (0..deals.len())
        .map(|i| {
            let base = i * COLUMNS_PER_DEAL;
            let slots: Vec<String> = (1..=COLUMNS_PER_DEAL).map(|j| format!("?{}", base + j)).collect();
            format!("({})", slots.join(", "))
        })
        .collect();

    let sql = format!("INSERT INTO deals ({DEAL_COLUMNS}) VALUES {}", placeholders.join(", "));

    let mut values: Vec<Box<dyn ToSql>> = Vec::with_capacity(deals.len() * COLUMNS_PER_DEAL);
    for deal in deals {
        values.push(Box::new(deal.id));
        values.push(Box::new(deal.title.clone()));
        values.push(Box::new(deal.value));
        values.push(Box::new(deal.currency.clone()));
        values.push(Box::new(deal.status.as_str()));
        values.push(Box::new(deal.stage_id));
        values.push(Box::new(deal.pipeline_id));
        values.push(Box::new(deal.user_id));
        values.push(Box::new(deal.creator_user_id));
        values.push(Box::new(deal.add_time.map(|t| t.timestamp())));
        values.push(Box::new(deal.won_time.map(|t| t.timestamp())));
        values.push(Box::new(deal.lost_time.map(|t| t.timestamp())));
        values.push(Box::new(deal.deal_type.clone()));
        values.push(Box::new(deal.country.clone()));
        values.push(Box::new(deal.origin.clone()));
        values.push(Box::new(deal.employee_count.clone()));
        values.push(Box::new(deal.sales_cycle_days));
    }

    tx.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))
        .map_err(map_sql_error)?;
    Ok(())
}

fn deal_from_row(row: &Row<'_>) -> rusqlite::Result<Deal> {
    let status: String = row.get(4)?;
    Ok(Deal {
        id: row.get(0)?,
        title: row.get(1)?,
        value: row.get(2)?,
        currency: row.get(3)?,
        status: DealStatus::parse(&status),
        stage_id: row.get(5)?,
        pipeline_id: row.get(6)?,
        user_id: row.get(7)?,
        creator_user_id: row.get(8)?,
        add_time: timestamp(row, 9)?,
        won_time: timestamp(row, 10)?,
        lost_time: timestamp(row, 11)?,
        deal_type: row.get(12)?,
        country: row.get(13)?,
        origin: row.get(14)?,
        employee_count: row.get(15)?,
        sales_cycle_days: row.get(16)?,
    })
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let secs: Option<i64> = row.get(idx)?;
    Ok(secs.and_then(|s| DateTime::from_timestamp(s, 0)))
}

pub(crate) fn map_join_error(err: task::JoinError) -> DealboardError {
    DealboardError::Internal(format!("blocking task failed: {err}"))
}
