//! Channel analytics snapshots and the follower milestones derived from them.
use crate::analytics_snapshots::Model;
use crate::error::Error;
use crate::notification_kind::NotificationKind;
use crate::platform::Platform;
use crate::{notifications, Id};
use entity_api::{analytics_snapshot, notification};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Follower counts that earn a milestone notification the first time a
/// snapshot reaches them.
pub const FOLLOWER_MILESTONES: [i64; 6] = [100, 1_000, 10_000, 100_000, 500_000, 1_000_000];

/// Records a snapshot for `user_id`, pushes it to their analytics stream,
/// and raises a milestone notification when a follower threshold is crossed.
///
/// The previous-count lookup, the snapshot and any milestone notification
/// commit together. Nothing is published unless the commit succeeds.
pub async fn record_snapshot(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    user_id: Id,
    snapshot_model: Model,
) -> Result<Model, Error> {
    validate(&snapshot_model)?;

    let txn = db.begin().await.map_err(Error::db_transaction)?;

    let previous_followers =
        analytics_snapshot::find_by_user(&txn, user_id, Some(snapshot_model.platform), Some(1))
            .await?
            .first()
            .map(|previous| previous.followers);

    let snapshot = analytics_snapshot::create(&txn, user_id, snapshot_model).await?;

    let milestone_notification = match crossed_milestone(previous_followers, snapshot.followers) {
        Some(milestone) => {
            info!(
                "User {user_id} reached {milestone} followers on {}",
                snapshot.platform
            );
            Some(
                notification::create(
                    &txn,
                    milestone_notification(user_id, snapshot.platform, milestone),
                )
                .await?,
            )
        }
        None => None,
    };

    txn.commit().await.map_err(Error::db_transaction)?;

    match serde_json::to_value(&snapshot) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::AnalyticsUpdated {
                    snapshot: value,
                    notify_user_id: user_id,
                })
                .await;
        }
        Err(err) => error!("Failed to serialize snapshot {}: {err}", snapshot.id),
    }

    if let Some(milestone_notification) = milestone_notification {
        crate::notification::publish_created(event_publisher, &milestone_notification).await;
    }

    Ok(snapshot)
}

pub async fn find_by_user(
    db: &DatabaseConnection,
    user_id: Id,
    platform: Option<Platform>,
    limit: Option<u64>,
) -> Result<Vec<Model>, Error> {
    Ok(analytics_snapshot::find_by_user(db, user_id, platform, limit).await?)
}

/// The highest milestone in `(previous, current]`. A first snapshot has no
/// previous count and never triggers a milestone.
pub fn crossed_milestone(previous: Option<i64>, current: i64) -> Option<i64> {
    let previous = previous?;
    FOLLOWER_MILESTONES
        .iter()
        .rev()
        .find(|&&milestone| previous < milestone && current >= milestone)
        .copied()
}

fn validate(model: &Model) -> Result<(), Error> {
    if model.followers < 0 || model.views < 0 || model.watch_time_minutes < 0 {
        return Err(Error::invalid("analytics counters must be non-negative"));
    }
    if !(0.0..=1.0).contains(&model.engagement_rate) {
        return Err(Error::invalid("engagement rate must be between 0 and 1"));
    }
    Ok(())
}

fn milestone_notification(user_id: Id, platform: Platform, milestone: i64) -> notifications::Model {
    let now = chrono::Utc::now();
    notifications::Model {
        id: Id::nil(),
        user_id,
        kind: NotificationKind::Milestone,
        title: format!("{milestone} followers on {platform}!"),
        message: format!("Your {platform} audience just passed {milestone} followers. Keep it up!"),
        link: Some("/analytics".to_owned()),
        read: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(user_id: Id, followers: i64) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            user_id,
            platform: Platform::Youtube,
            followers,
            views: 50_000,
            watch_time_minutes: 12_000,
            engagement_rate: 0.05,
            recorded_at: now.into(),
            created_at: now.into(),
        }
    }

    #[test]
    fn first_snapshot_never_crosses_a_milestone() {
        assert_eq!(crossed_milestone(None, 2_000), None);
    }

    #[test]
    fn crossing_reports_the_highest_threshold() {
        assert_eq!(crossed_milestone(Some(900), 1_000), Some(1_000));
        assert_eq!(crossed_milestone(Some(50), 20_000), Some(10_000));
    }

    #[test]
    fn staying_above_a_threshold_is_not_a_new_milestone() {
        assert_eq!(crossed_milestone(Some(1_000), 1_500), None);
        assert_eq!(crossed_milestone(Some(1_500), 900), None);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let user_id = Id::new_v4();
        assert!(validate(&Model {
            followers: -1,
            ..snapshot(user_id, 0)
        })
        .is_err());
        assert!(validate(&Model {
            engagement_rate: 1.5,
            ..snapshot(user_id, 0)
        })
        .is_err());
        assert!(validate(&snapshot(user_id, 10)).is_ok());
    }

    #[cfg(feature = "mock")]
    mod mock {
        use super::*;
        use crate::notification::test_support::RecordingHandler;
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
        use std::sync::Arc;

        #[tokio::test]
        async fn record_snapshot_publishes_analytics_update() -> Result<(), Error> {
            let user_id = Id::new_v4();
            let previous = snapshot(user_id, 400);
            let stored = snapshot(user_id, 450);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[previous]])
                .append_query_results([[stored.clone()]])
                .into_connection();
            let recorder = Arc::new(RecordingHandler::default());
            let publisher = EventPublisher::new().with_handler(recorder.clone());

            let recorded = record_snapshot(&db, &publisher, user_id, stored.clone()).await?;

            assert_eq!(recorded, stored);
            let events = recorder.events.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert!(matches!(
                &events[0],
                DomainEvent::AnalyticsUpdated { notify_user_id, snapshot }
                    if *notify_user_id == user_id && snapshot["followers"] == 450
            ));
            Ok(())
        }

        #[tokio::test]
        async fn record_snapshot_raises_milestone_notification() -> Result<(), Error> {
            let user_id = Id::new_v4();
            let previous = snapshot(user_id, 990);
            let stored = snapshot(user_id, 1_010);
            let now = Utc::now();
            let milestone_row = notifications::Model {
                id: Id::new_v4(),
                created_at: now.into(),
                updated_at: now.into(),
                ..milestone_notification(user_id, Platform::Youtube, 1_000)
            };
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[previous]])
                .append_query_results([[stored.clone()]])
                .append_query_results([[milestone_row]])
                .into_connection();
            let recorder = Arc::new(RecordingHandler::default());
            let publisher = EventPublisher::new().with_handler(recorder.clone());

            record_snapshot(&db, &publisher, user_id, stored).await?;

            let events = recorder.events.lock().unwrap();
            assert_eq!(events.len(), 2);
            assert!(matches!(events[0], DomainEvent::AnalyticsUpdated { .. }));
            match &events[1] {
                DomainEvent::NotificationCreated { notification, .. } => {
                    assert_eq!(notification["kind"], "milestone");
                    assert_eq!(notification["title"], "1000 followers on YouTube!");
                }
                other => panic!("unexpected event {other:?}"),
            }
            Ok(())
        }

        #[tokio::test]
        async fn failed_milestone_insert_publishes_nothing() {
            let user_id = Id::new_v4();
            let previous = snapshot(user_id, 990);
            let stored = snapshot(user_id, 1_010);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[previous]])
                .append_query_results([[stored.clone()]])
                .append_query_errors([DbErr::Custom("notifications insert failed".to_owned())])
                .into_connection();
            let recorder = Arc::new(RecordingHandler::default());
            let publisher = EventPublisher::new().with_handler(recorder.clone());

            let result = record_snapshot(&db, &publisher, user_id, stored).await;

            assert!(result.is_err());
            assert!(recorder.events.lock().unwrap().is_empty());
        }
    }
}
