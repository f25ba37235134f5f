use std::env;

use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;

use jobjet::accounts::{AccountError, AccountRepo, NewAccount, PgAccountRepo, ProfileUpdate, UniqueField};
use jobjet::db::apply_schema;

/// Connects to `TEST_DATABASE_URL` when set. Without it these tests are skipped
/// so `cargo test` stays runnable without a database.
async fn repo() -> Option<PgAccountRepo> {
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("skipping postgres account tests (set TEST_DATABASE_URL to enable)");
        return None;
    };
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    apply_schema(&db).await.expect("apply schema");
    Some(PgAccountRepo::new(db))
}

fn unique_account() -> NewAccount {
    let tag = OffsetDateTime::now_utc().unix_timestamp_nanos();
    NewAccount {
        name: "Pg Tester".into(),
        user_name: format!("pg{tag}"),
        email: format!("pg{tag}@example.com"),
        password: "opaque".into(),
        phone_number: None,
    }
}

#[tokio::test]
async fn round_trip_and_timestamps() {
    let Some(repo) = repo().await else { return };
    let new = unique_account();
    let created = repo.create(&new).await.expect("create");
    assert!(created.created_at <= created.updated_at);
    assert!(created.deleted_at.is_none());

    let read = repo.find_by_id(created.id).await.unwrap().expect("row");
    assert_eq!(read.name, new.name);
    assert_eq!(read.user_name, new.user_name);
    assert_eq!(read.email, new.email);

    let updated = repo
        .update_profile(
            created.id,
            &ProfileUpdate {
                phone_number: Some(Some("+1 555 0100".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.phone_number.as_deref(), Some("+1 555 0100"));
}

#[tokio::test]
async fn unique_columns_conflict_until_soft_deleted() {
    let Some(repo) = repo().await else { return };
    let new = unique_account();
    let first = repo.create(&new).await.unwrap();

    let mut dup = new.clone();
    dup.email = format!("other.{}", new.email);
    assert!(matches!(
        repo.create(&dup).await,
        Err(AccountError::Conflict {
            field: UniqueField::UserName
        })
    ));

    repo.soft_delete(first.id).await.unwrap();
    assert!(repo.find_by_email(&new.email).await.unwrap().is_none());
    assert!(matches!(
        repo.soft_delete(first.id).await,
        Err(AccountError::NotFound)
    ));

    let again = repo.create(&new).await.expect("reusable after soft delete");
    assert_ne!(again.id, first.id);
}
