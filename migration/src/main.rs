use sea_orm_migration::prelude::*;

/// `cargo run -p migration -- up` applies pending migrations against
/// `DATABASE_URL`; `-- --help` lists the other commands.
#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
