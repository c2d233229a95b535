use goldenhouse_api::{app, config, database, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up GOLDENHOUSE_DB, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goldenhouse_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Goldenhouse API in {:?} mode", config.environment);

    let pool = database::manager::connect(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to open database {}: {}", config.database.path, e));

    database::manager::migrate(&pool)
        .await
        .expect("schema migration failed");
    database::manager::seed(&pool)
        .await
        .expect("seeding defaults failed");

    let uploads_dir = std::path::PathBuf::from(&config.uploads.dir);
    if let Err(e) = tokio::fs::create_dir_all(&uploads_dir).await {
        panic!("failed to create uploads dir {:?}: {}", uploads_dir, e);
    }

    let state = AppState::new(pool, uploads_dir);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("GOLDENHOUSE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Goldenhouse API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
