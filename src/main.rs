use bboard::{accounts, api, db, listings, AppState};
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url = dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:bboard.db".into());
    let db_pool = match db::connect(&database_url).await {
        Ok(pool) => pool,
        Err(err) => anyhow::bail!("could not open {database_url}: {err:?}"),
    };
    if let Err(err) = db::init_schema(&db_pool).await {
        anyhow::bail!("schema init failed: {err:?}");
    }

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let app_state = AppState { db_pool };

    let app = axum::Router::new()
        .nest("/accounts", accounts::router())
        .nest("/api", api::router().layer(CorsLayer::permissive()))
        .merge(listings::router())
        .with_state(app_state)
        .layer(session_layer);

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    tracing::info!("serving bboard on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
