//! Integration tests for `PgFlagStore`.

use sqlx::PgPool;
use uuid::Uuid;
use waymark_core::flags::FlagName;
use waymark_core::model::TemplateId;
use waymark_core::ports::FlagStore;
use waymark_flag_store::pg_flag_store::PgFlagStore;

// --- get_flag ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_flag_returns_false_for_unknown_identity(pool: PgPool) {
    let store = PgFlagStore::new(pool);

    let seen = store.get_flag(Uuid::new_v4(), &FlagName::HasSeenTour).await.unwrap();

    assert!(!seen);
}

// --- set_flag + get_flag round-trip ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_set_then_get_flag(pool: PgPool) {
    let store = PgFlagStore::new(pool);
    let identity = Uuid::new_v4();

    store.set_flag(identity, &FlagName::HasSeenTour, true).await.unwrap();

    assert!(store.get_flag(identity, &FlagName::HasSeenTour).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_set_flag_overwrites_previous_value(pool: PgPool) {
    let store = PgFlagStore::new(pool.clone());
    let identity = Uuid::new_v4();

    store.set_flag(identity, &FlagName::HasSeenTour, true).await.unwrap();
    store.set_flag(identity, &FlagName::HasSeenTour, false).await.unwrap();

    assert!(!store.get_flag(identity, &FlagName::HasSeenTour).await.unwrap());
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_flags WHERE identity = $1")
        .bind(identity)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

// --- scoping ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_flags_are_scoped_per_identity(pool: PgPool) {
    let store = PgFlagStore::new(pool);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    store.set_flag(first, &FlagName::HasSeenTour, true).await.unwrap();

    assert!(!store.get_flag(second, &FlagName::HasSeenTour).await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_completion_flag_is_stored_under_template_key(pool: PgPool) {
    let store = PgFlagStore::new(pool.clone());
    let identity = Uuid::new_v4();
    let flag = FlagName::TemplateCompleted(TemplateId::new("default"));

    store.set_flag(identity, &flag, true).await.unwrap();

    let key: String = sqlx::query_scalar("SELECT flag_key FROM tour_flags WHERE identity = $1")
        .bind(identity)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(key, "tour.completed.default");
}
