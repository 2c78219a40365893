use super::error::Error;
use chrono::Utc;
use entity::notifications::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ConnectionTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub async fn create(db: &impl ConnectionTrait, notification_model: Model) -> Result<Model, Error> {
    debug!("New Notification Model to be inserted: {notification_model:?}");

    let now = Utc::now();

    let active_model: ActiveModel = ActiveModel {
        user_id: Set(notification_model.user_id),
        kind: Set(notification_model.kind),
        title: Set(notification_model.title),
        message: Set(notification_model.message),
        link: Set(notification_model.link),
        read: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Newest first. With `unread_only`, read notifications are skipped.
pub async fn find_by_user(
    db: &impl ConnectionTrait,
    user_id: Id,
    unread_only: bool,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::UserId.eq(user_id));

    if unread_only {
        query = query.filter(Column::Read.eq(false));
    }

    Ok(query.order_by_desc(Column::CreatedAt).all(db).await?)
}

pub async fn mark_read(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    let notification = find_by_id(db, id).await?;

    if notification.read {
        return Ok(notification);
    }

    let mut active_model: ActiveModel = notification.into();
    active_model.read = Set(true);
    active_model.updated_at = Set(Utc::now().into());

    Ok(active_model.update(db).await?)
}

/// Returns the number of notifications that changed state.
pub async fn mark_all_read(db: &impl ConnectionTrait, user_id: Id) -> Result<u64, Error> {
    let now: DateTimeWithTimeZone = Utc::now().into();

    let result = Entity::update_many()
        .col_expr(Column::Read, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Read.eq(false))
        .exec(db)
        .await?;

    debug!(
        "Marked {} notification(s) read for user {user_id}",
        result.rows_affected
    );

    Ok(result.rows_affected)
}

pub async fn unread_count(db: &impl ConnectionTrait, user_id: Id) -> Result<u64, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Read.eq(false))
        .count(db)
        .await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use entity::notification_kind::NotificationKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn notification(user_id: Id, read: bool) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            user_id,
            kind: NotificationKind::Milestone,
            title: "10K subscribers!".to_owned(),
            message: "Your channel just crossed 10,000 subscribers.".to_owned(),
            link: Some("/analytics".to_owned()),
            read,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_inserted_unread_notification() -> Result<(), Error> {
        let inserted = notification(Id::new_v4(), false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[inserted.clone()]])
            .into_connection();

        let created = create(&db, inserted.clone()).await?;

        assert_eq!(created, inserted);
        assert!(!created.read);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_notification() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let err = find_by_id(&db, Id::new_v4()).await.unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[tokio::test]
    async fn mark_read_skips_update_when_already_read() -> Result<(), Error> {
        let already_read = notification(Id::new_v4(), true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[already_read.clone()]])
            .into_connection();

        let result = mark_read(&db, already_read.id).await?;

        assert_eq!(result, already_read);
        assert_eq!(db.into_transaction_log().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn mark_read_updates_unread_notification() -> Result<(), Error> {
        let unread = notification(Id::new_v4(), false);
        let updated = Model {
            read: true,
            ..unread.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[unread.clone()]])
            .append_query_results([[updated.clone()]])
            .into_connection();

        let result = mark_read(&db, unread.id).await?;

        assert!(result.read);
        assert_eq!(db.into_transaction_log().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn mark_all_read_returns_rows_affected() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 4,
            }])
            .into_connection();

        assert_eq!(mark_all_read(&db, Id::new_v4()).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn unread_count_reads_num_items() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(3)),
            )])]])
            .into_connection();

        assert_eq!(unread_count(&db, Id::new_v4()).await?, 3);
        Ok(())
    }
}
