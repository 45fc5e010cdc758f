use axum::serve;
use scene_db_rust::config::AppConfig;
use scene_db_rust::seed;
use scene_db_rust::store::{MemoryStore, PostgresStore, Store};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("scene-db: Entity Graph Server");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    // SCENEDB_STORE=memory runs without a database; anything persists
    // only for the lifetime of the process.
    if std::env::var("SCENEDB_STORE").unwrap_or_default() == "memory" {
        println!("Using in-memory store (no persistence)");
        let store = Arc::new(MemoryStore::new());
        maybe_seed(&*store).await?;
        return run_server(store, &config).await;
    }

    println!("Connecting to PostgreSQL...");
    let database_url = config.database_url()?;
    let postgres_store = PostgresStore::new(&database_url, config.max_connections()).await?;

    println!("Running database migrations...");
    postgres_store.migrate().await?;
    println!("Database ready");

    let store = Arc::new(postgres_store);
    maybe_seed(&*store).await?;

    run_server(store, &config).await
}

async fn maybe_seed<S: Store>(store: &S) -> anyhow::Result<()> {
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        println!("Loading seed data...");
        seed::load_seed_data(store).await?;
        println!("Seed data loaded successfully");
    }
    Ok(())
}

async fn run_server<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    let app = scene_db_rust::api::create_router().with_state(store);
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("scene-db server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
