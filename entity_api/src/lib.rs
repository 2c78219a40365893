use chrono::Utc;
use entity::notification_kind::NotificationKind;
use log::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{analytics_snapshots, notification_kind, notifications, platform, users, Id};

pub mod analytics_snapshot;
pub mod error;
pub mod notification;
pub mod user;

/// Populates a development database with two creators and a welcome
/// notification for each.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    for (email, first_name, last_name, display_name) in [
        ("jordan@creatorcompass.io", "Jordan", "Reyes", "JordanPlays"),
        ("sam@creatorcompass.io", "Sam", "Okafor", "SamCooks"),
    ] {
        let creator = users::ActiveModel {
            email: Set(email.to_owned()),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            display_name: Set(Some(display_name.to_owned())),
            password: Set(user::generate_hash("password".to_owned())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        notifications::ActiveModel {
            user_id: Set(creator.id),
            kind: Set(NotificationKind::System),
            title: Set("Welcome to CreatorCompass".to_owned()),
            message: Set("Connect a channel to start tracking your growth.".to_owned()),
            link: Set(Some("/settings/channels".to_owned())),
            read: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Seeded creator {email}");
    }

    Ok(())
}
