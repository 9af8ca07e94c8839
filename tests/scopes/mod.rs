//! Query scope tests against a seeded collection.

use sqlx::PgPool;

use taskledger_core::constants::{TaskState, TaskStatus};
use taskledger_core::models::{NewTaskRecord, TaskRecord};
use taskledger_core::scopes::StatusFilter;

use crate::common::{backdate, create_task, link_job};

async fn seed(pool: &PgPool, name: &str, userid: &str, state: TaskState, status: TaskStatus) -> taskledger_core::Result<TaskRecord> {
    TaskRecord::create(
        pool,
        NewTaskRecord {
            name: name.to_string(),
            userid: Some(userid.to_string()),
            state: Some(state),
            status: Some(status),
            ..Default::default()
        },
    )
    .await
}

#[sqlx::test]
async fn test_state_partition_scopes(pool: PgPool) -> taskledger_core::Result<()> {
    seed(&pool, "a", "alice", TaskState::Initialized, TaskStatus::Ok).await?;
    seed(&pool, "b", "alice", TaskState::Queued, TaskStatus::Ok).await?;
    seed(&pool, "c", "bob", TaskState::Active, TaskStatus::Ok).await?;
    seed(&pool, "d", "bob", TaskState::Finished, TaskStatus::Ok).await?;

    assert_eq!(TaskRecord::scope().active().count(&pool).await?, 1);
    assert_eq!(TaskRecord::scope().queued().count(&pool).await?, 1);
    assert_eq!(TaskRecord::scope().finished().count(&pool).await?, 1);
    // Running excludes both terminal and queued records
    assert_eq!(TaskRecord::scope().running().count(&pool).await?, 2);

    Ok(())
}

#[sqlx::test]
async fn test_completed_scopes_split_by_status(pool: PgPool) -> taskledger_core::Result<()> {
    seed(&pool, "ok", "alice", TaskState::Finished, TaskStatus::Ok).await?;
    seed(&pool, "warn", "alice", TaskState::Finished, TaskStatus::Warn).await?;
    seed(&pool, "err", "alice", TaskState::Finished, TaskStatus::Error).await?;
    seed(&pool, "running", "alice", TaskState::Active, TaskStatus::Ok).await?;

    assert_eq!(TaskRecord::scope().completed_ok().count(&pool).await?, 1);
    assert_eq!(TaskRecord::scope().completed_warn().count(&pool).await?, 1);
    assert_eq!(TaskRecord::scope().completed_error().count(&pool).await?, 1);

    Ok(())
}

#[sqlx::test]
async fn test_with_status_in_or_combination(pool: PgPool) -> taskledger_core::Result<()> {
    seed(&pool, "ok", "alice", TaskState::Finished, TaskStatus::Ok).await?;
    seed(&pool, "err", "alice", TaskState::Finished, TaskStatus::Error).await?;
    seed(&pool, "queued", "alice", TaskState::Queued, TaskStatus::Ok).await?;
    seed(&pool, "active", "alice", TaskState::Active, TaskStatus::Ok).await?;

    let combined = TaskRecord::scope()
        .with_status_in(&[StatusFilter::CompletedOk, StatusFilter::Queued])
        .all(&pool)
        .await?;
    assert_eq!(combined.len(), 2);

    let everything_finished_or_running = TaskRecord::scope()
        .with_status_in(&[StatusFilter::Finished, StatusFilter::Running])
        .count(&pool)
        .await?;
    assert_eq!(everything_finished_or_running, 3);

    Ok(())
}

#[sqlx::test]
async fn test_identity_scopes(pool: PgPool) -> taskledger_core::Result<()> {
    seed(&pool, "a", "alice", TaskState::Queued, TaskStatus::Ok).await?;
    seed(&pool, "b", "bob", TaskState::Queued, TaskStatus::Ok).await?;

    let mut owned = create_task(&pool, "owned").await?;
    owned.state_active(&pool, Some("server-9")).await?;

    assert_eq!(TaskRecord::scope().with_userid("alice").count(&pool).await?, 1);
    assert_eq!(TaskRecord::scope().with_userid("nobody").count(&pool).await?, 0);
    assert_eq!(TaskRecord::scope().with_owner("server-9").count(&pool).await?, 1);

    Ok(())
}

#[sqlx::test]
async fn test_staleness_scopes(pool: PgPool) -> taskledger_core::Result<()> {
    let stale = seed(&pool, "stale", "alice", TaskState::Active, TaskStatus::Ok).await?;
    backdate(&pool, stale.id, 1_000.0).await?;

    let linked = seed(&pool, "linked", "alice", TaskState::Active, TaskStatus::Ok).await?;
    link_job(&pool, linked.id, 5).await?;
    backdate(&pool, linked.id, 1_000.0).await?;

    seed(&pool, "fresh", "alice", TaskState::Active, TaskStatus::Ok).await?;

    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::seconds(500);
    let sweep_candidates = TaskRecord::scope()
        .active()
        .timed_out(cutoff)
        .no_linked_job()
        .all(&pool)
        .await?;

    assert_eq!(sweep_candidates.len(), 1);
    assert_eq!(sweep_candidates[0].id, stale.id);

    Ok(())
}

#[sqlx::test]
async fn test_updated_between_window(pool: PgPool) -> taskledger_core::Result<()> {
    let old = seed(&pool, "old", "alice", TaskState::Finished, TaskStatus::Ok).await?;
    backdate(&pool, old.id, 3_600.0).await?;
    seed(&pool, "new", "alice", TaskState::Finished, TaskStatus::Ok).await?;

    let now = chrono::Utc::now().naive_utc();
    let window = TaskRecord::scope()
        .with_updated_between(now - chrono::Duration::seconds(7_200), now - chrono::Duration::seconds(1_800))
        .all(&pool)
        .await?;

    assert_eq!(window.len(), 1);
    assert_eq!(window[0].id, old.id);

    Ok(())
}

#[sqlx::test]
async fn test_first_and_exists(pool: PgPool) -> taskledger_core::Result<()> {
    assert!(!TaskRecord::scope().finished().exists(&pool).await?);
    assert!(TaskRecord::scope().finished().first(&pool).await?.is_none());

    let seeded = seed(&pool, "only", "alice", TaskState::Finished, TaskStatus::Ok).await?;

    assert!(TaskRecord::scope().finished().exists(&pool).await?);
    let first = TaskRecord::scope().finished().first(&pool).await?.expect("seeded record");
    assert_eq!(first.id, seeded.id);

    Ok(())
}
