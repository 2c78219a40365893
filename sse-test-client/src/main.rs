use anyhow::Result;
use clap::Parser;
use colored::*;

mod api_client;
mod auth;
mod output;
mod scenarios;
mod sse_client;

use api_client::ApiClient;
use auth::{login, UserCredentials};
use output::print_test_summary;
use scenarios::Streams;
use sse_client::{Channel, Connection};

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "End-to-end checks for the notification and analytics streams")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long, default_value = "http://localhost:4000")]
    base_url: String,

    /// User 1 credentials (format: email:password)
    #[arg(long)]
    user1: String,

    /// User 2 credentials (format: email:password)
    #[arg(long)]
    user2: String,

    /// Test scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq, Eq)]
enum ScenarioChoice {
    /// Every stream opens with a connected frame
    ConnectionTest,
    /// A created notification reaches only its recipient
    NotificationDelivery,
    /// A recorded snapshot reaches only its owner's analytics stream
    AnalyticsUpdate,
    /// A second stream for the same user closes the first
    ConnectionReplacement,
    /// Run every scenario in order
    All,
}

async fn open(
    base_url: &str,
    channel: Channel,
    user: &auth::AuthenticatedUser,
    suffix: &str,
) -> Result<Connection> {
    Connection::establish(
        base_url,
        channel,
        &user.session_cookie,
        format!("{} {suffix}", user.label),
    )
    .await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let user1_creds = UserCredentials::parse(&cli.user1)?;
    let user2_creds = UserCredentials::parse(&cli.user2)?;

    let client = reqwest::Client::new();
    let api_client = ApiClient::new(client.clone(), cli.base_url.clone());
    api_client.health().await?;

    println!("{} Authenticating users...", "→".blue());
    let user1 = login(&client, &cli.base_url, &user1_creds, "User 1").await?;
    let user2 = login(&client, &cli.base_url, &user2_creds, "User 2").await?;
    println!("{} User 1 authenticated (ID: {})", "✓".green(), user1.user_id);
    println!("{} User 2 authenticated (ID: {})", "✓".green(), user2.user_id);

    println!("\n{} Opening streams...", "→".blue());
    let mut streams = Streams {
        user1_notifications: open(&cli.base_url, Channel::Notifications, &user1, "notifications")
            .await?,
        user2_notifications: open(&cli.base_url, Channel::Notifications, &user2, "notifications")
            .await?,
        user1_analytics: open(&cli.base_url, Channel::Analytics, &user1, "analytics").await?,
        user2_analytics: open(&cli.base_url, Channel::Analytics, &user2, "analytics").await?,
    };

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let wants = |choice: ScenarioChoice| cli.scenario == choice || cli.scenario == ScenarioChoice::All;
    let mut results = Vec::new();

    // Every other scenario relies on the connected frames being consumed first.
    results.push(scenarios::test_connection(&mut streams).await);

    if wants(ScenarioChoice::NotificationDelivery) {
        results.push(
            scenarios::test_notification_delivery(&user1, &user2, &api_client, &mut streams).await,
        );
    }
    if wants(ScenarioChoice::AnalyticsUpdate) {
        results.push(scenarios::test_analytics_update(&user1, &api_client, &mut streams).await);
    }
    if wants(ScenarioChoice::ConnectionReplacement) {
        results.push(
            scenarios::test_connection_replacement(
                &cli.base_url,
                &user1,
                &user2,
                &api_client,
                &mut streams,
            )
            .await,
        );
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
