//! Integration tests for the SQLite cache repositories.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use dealboard_core::ports::{
    CacheMetadataRepository, DealRepository, ReferenceRepository, TeamDirectory,
};
use dealboard_domain::constants::{DEAL_CACHE_NAME, METRICS_PIPELINE_ID};
use dealboard_domain::{
    CacheMetadata, CrmUser, Deal, DealStatus, FieldOption, SyncStatus, Team,
};
use dealboard_infra::{
    DbManager, SqliteCacheMetadataRepository, SqliteDealRepository, SqliteReferenceRepository,
    SqliteTeamDirectory,
};
use tempfile::TempDir;

fn manager() -> (TempDir, Arc<DbManager>) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db = DbManager::new(temp_dir.path().join("test.db"), 4).expect("manager");
    db.run_migrations().expect("migrations");
    (temp_dir, Arc::new(db))
}

fn deal(id: i64) -> Deal {
    Deal {
        id,
        title: Some(format!("Deal {id}")),
        value: 100.0 * id as f64,
        currency: Some("EUR".into()),
        status: DealStatus::Won,
        stage_id: 5,
        pipeline_id: METRICS_PIPELINE_ID,
        user_id: Some(7),
        creator_user_id: None,
        add_time: Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()),
        won_time: Some(Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap()),
        lost_time: None,
        deal_type: Some("14".into()),
        country: Some("45".into()),
        origin: Some("7".into()),
        employee_count: None,
        sales_cycle_days: Some(9),
    }
}

#[tokio::test]
async fn replace_all_round_trips_every_column() {
    let (_dir, db) = manager();
    let repo = SqliteDealRepository::new(db);

    let inserted = repo.replace_all(&[deal(1), deal(2)]).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(repo.count().await.unwrap(), 2);

    let mut rows = repo.get_all().await.unwrap();
    rows.sort_by_key(|d| d.id);
    let first = &rows[0];
    let expected = deal(1);
    assert_eq!(first.title, expected.title);
    assert_eq!(first.value, expected.value);
    assert_eq!(first.status, DealStatus::Won);
    assert_eq!(first.add_time, expected.add_time);
    assert_eq!(first.won_time, expected.won_time);
    assert_eq!(first.deal_type, expected.deal_type);
    assert_eq!(first.sales_cycle_days, Some(9));
}

#[tokio::test]
async fn replace_all_discards_the_previous_snapshot() {
    let (_dir, db) = manager();
    let repo = SqliteDealRepository::new(db);

    repo.replace_all(&[deal(1), deal(2), deal(3)]).await.unwrap();
    repo.replace_all(&[deal(9)]).await.unwrap();

    let rows = repo.get_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 9);
}

#[tokio::test]
async fn replace_all_with_empty_input_empties_the_cache() {
    let (_dir, db) = manager();
    let repo = SqliteDealRepository::new(db);

    repo.replace_all(&[deal(1)]).await.unwrap();
    let inserted = repo.replace_all(&[]).await.unwrap();
    assert_eq!(inserted, 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn replace_all_handles_more_rows_than_one_batch() {
    let (_dir, db) = manager();
    let repo = SqliteDealRepository::new(db);

    let deals: Vec<Deal> = (1..=450).map(deal).collect();
    let inserted = repo.replace_all(&deals).await.unwrap();
    assert_eq!(inserted, 450);
    assert_eq!(repo.count().await.unwrap(), 450);
}

#[tokio::test]
async fn metadata_upsert_overwrites_the_singleton_row() {
    let (_dir, db) = manager();
    let repo = SqliteCacheMetadataRepository::new(db);

    assert!(repo.get(DEAL_CACHE_NAME).await.unwrap().is_none());

    repo.upsert(&CacheMetadata {
        cache_name: DEAL_CACHE_NAME.into(),
        last_sync_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()),
        last_sync_status: SyncStatus::InProgress,
        last_sync_error: None,
        total_records: 0,
        sync_duration_ms: None,
    })
    .await
    .unwrap();

    repo.upsert(&CacheMetadata {
        cache_name: DEAL_CACHE_NAME.into(),
        last_sync_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 5).unwrap()),
        last_sync_status: SyncStatus::Success,
        last_sync_error: None,
        total_records: 42,
        sync_duration_ms: Some(5000),
    })
    .await
    .unwrap();

    let meta = repo.get(DEAL_CACHE_NAME).await.unwrap().unwrap();
    assert_eq!(meta.last_sync_status, SyncStatus::Success);
    assert_eq!(meta.total_records, 42);
    assert_eq!(meta.sync_duration_ms, Some(5000));
}

#[tokio::test]
async fn reference_data_replaces_per_field() {
    let (_dir, db) = manager();
    let repo = SqliteReferenceRepository::new(db);

    repo.replace_users(&[CrmUser {
        id: 7,
        name: "Jane Doe".into(),
        email: Some("jane@example.com".into()),
        active: true,
    }])
    .await
    .unwrap();
    repo.replace_field_options(
        "country",
        &[FieldOption { code: "45".into(), label: "Germany".into() }],
    )
    .await
    .unwrap();
    repo.replace_field_options(
        "origin",
        &[FieldOption { code: "7".into(), label: "Inbound".into() }],
    )
    .await
    .unwrap();

    // Replacing one field leaves the other untouched
    repo.replace_field_options(
        "country",
        &[FieldOption { code: "46".into(), label: "Austria".into() }],
    )
    .await
    .unwrap();

    let users = repo.get_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Jane Doe");
    assert!(users[0].active);

    let countries = repo.get_field_options("country").await.unwrap();
    assert_eq!(countries, vec![FieldOption { code: "46".into(), label: "Austria".into() }]);
    let origins = repo.get_field_options("origin").await.unwrap();
    assert_eq!(origins.len(), 1);
}

#[tokio::test]
async fn team_directory_round_trips_members() {
    let (_dir, db) = manager();
    let directory = SqliteTeamDirectory::new(db);

    directory
        .seed_team(
            Team { id: 1, name: "Alpha".into() },
            vec![("Jane Doe".into(), Some(7)), ("John Roe".into(), None)],
        )
        .await
        .unwrap();

    let teams = directory.teams().await.unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "Alpha");

    let team = directory.team(1).await.unwrap().unwrap();
    assert_eq!(team.name, "Alpha");
    assert!(directory.team(99).await.unwrap().is_none());

    let members = directory.members(1).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].crm_user_id, Some(7));
    assert_eq!(members[1].crm_user_id, None);

    // Re-seeding replaces the member list
    directory
        .seed_team(Team { id: 1, name: "Alpha".into() }, vec![("Jane Doe".into(), Some(7))])
        .await
        .unwrap();
    assert_eq!(directory.members(1).await.unwrap().len(), 1);
}
