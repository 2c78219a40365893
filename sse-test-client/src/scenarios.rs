use crate::api_client::ApiClient;
use crate::auth::AuthenticatedUser;
use crate::output::TestResult;
use crate::sse_client::{Channel, Connection};
use anyhow::Result;
use colored::*;
use std::future::Future;
use std::time::{Duration, Instant};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to listen before concluding an event was not delivered.
const SILENCE_WINDOW: Duration = Duration::from_secs(2);

/// Open streams for both users on both channels.
pub struct Streams {
    pub user1_notifications: Connection,
    pub user2_notifications: Connection,
    pub user1_analytics: Connection,
    pub user2_analytics: Connection,
}

async fn run<F>(name: &str, body: F) -> TestResult
where
    F: Future<Output = Result<()>>,
{
    println!("\n{} {name}", "→".blue());
    let started = Instant::now();
    match body.await {
        Ok(()) => TestResult::pass(name, started.elapsed()),
        Err(err) => TestResult::fail(name, started.elapsed(), format!("{err:#}")),
    }
}

/// Every stream starts with a `connected` frame.
pub async fn test_connection(streams: &mut Streams) -> TestResult {
    run("connection-test", async {
        for connection in [
            &mut streams.user1_notifications,
            &mut streams.user2_notifications,
            &mut streams.user1_analytics,
            &mut streams.user2_analytics,
        ] {
            connection.wait_for_event("connected", EVENT_TIMEOUT).await?;
            println!("  {} {} connected", "✓".green(), connection.label);
        }
        Ok(())
    })
    .await
}

/// A notification for user 2 reaches only user 2's notification stream.
pub async fn test_notification_delivery(
    user1: &AuthenticatedUser,
    user2: &AuthenticatedUser,
    api_client: &ApiClient,
    streams: &mut Streams,
) -> TestResult {
    run("notification-delivery", async {
        let title = format!("Stream check {}", uuid::Uuid::new_v4());
        api_client
            .create_notification(
                &user1.session_cookie,
                &user2.user_id,
                &title,
                "Delivered by the stream test client.",
            )
            .await?;

        let event = streams
            .user2_notifications
            .wait_for_event("notification", EVENT_TIMEOUT)
            .await?;
        let received = event.data["notification"]["title"].as_str().unwrap_or_default();
        if received != title {
            anyhow::bail!("expected title {title:?}, received {received:?}");
        }
        println!("  {} {} received the notification", "✓".green(), user2.label);

        streams
            .user1_notifications
            .expect_no_event("notification", SILENCE_WINDOW)
            .await?;
        streams
            .user2_analytics
            .expect_no_event("notification", SILENCE_WINDOW)
            .await?;
        println!("  {} no other stream saw it", "✓".green());

        let unread = api_client.unread_count(&user2.session_cookie).await?;
        if unread == 0 {
            anyhow::bail!("{} reports no unread notifications", user2.label);
        }
        Ok(())
    })
    .await
}

/// A snapshot recorded by user 1 reaches only user 1's analytics stream.
pub async fn test_analytics_update(
    user1: &AuthenticatedUser,
    api_client: &ApiClient,
    streams: &mut Streams,
) -> TestResult {
    run("analytics-update", async {
        let snapshot = api_client
            .record_snapshot(&user1.session_cookie, "youtube", 4_321, 98_765)
            .await?;

        let event = streams
            .user1_analytics
            .wait_for_event("analytics-update", EVENT_TIMEOUT)
            .await?;
        if event.data["data"]["id"] != snapshot["id"] {
            anyhow::bail!(
                "expected snapshot {}, received {}",
                snapshot["id"],
                event.data["data"]["id"]
            );
        }
        println!("  {} {} received the snapshot", "✓".green(), user1.label);

        streams
            .user2_analytics
            .expect_no_event("analytics-update", SILENCE_WINDOW)
            .await?;
        println!("  {} other user's stream stayed quiet", "✓".green());
        Ok(())
    })
    .await
}

/// Opening a second notification stream for user 1 ends the first one and
/// routes later events to the new stream.
pub async fn test_connection_replacement(
    base_url: &str,
    user1: &AuthenticatedUser,
    user2: &AuthenticatedUser,
    api_client: &ApiClient,
    streams: &mut Streams,
) -> TestResult {
    run("connection-replacement", async {
        let mut replacement = Connection::establish(
            base_url,
            Channel::Notifications,
            &user1.session_cookie,
            format!("{} (replacement)", user1.label),
        )
        .await?;
        replacement
            .wait_for_event("connected", EVENT_TIMEOUT)
            .await?;

        streams
            .user1_notifications
            .wait_for_close(EVENT_TIMEOUT)
            .await?;
        println!("  {} original stream was closed", "✓".green());

        api_client
            .create_notification(
                &user2.session_cookie,
                &user1.user_id,
                "Replacement check",
                "Should arrive on the newest stream.",
            )
            .await?;
        replacement
            .wait_for_event("notification", EVENT_TIMEOUT)
            .await?;
        println!("  {} replacement stream received the notification", "✓".green());

        streams.user1_notifications = replacement;
        Ok(())
    })
    .await
}
