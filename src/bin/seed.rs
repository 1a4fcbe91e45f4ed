use kitchen_budget_api::{
    clock::BusinessCalendar,
    config::AppConfig,
    db::run_migrations,
    seed::{sample_accounts, seed_accounts},
    store::postgres::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let config = AppConfig::from_env()?;

    let calendar = BusinessCalendar::new(config.policy.utc_offset_hours);
    let store = PgStore::connect(config.require_database_url()?, calendar).await?;
    // Ensure migrations are applied.
    run_migrations(store.orm()).await?;

    let accounts = sample_accounts();
    let total = accounts.len();
    let added = seed_accounts(&store, accounts).await?;

    println!("Seed completed. {added} of {total} sample accounts added");
    Ok(())
}
