mod config;
mod db;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::PortalConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let pool = db::connect(&config).await.expect("database init failed");
    let state = state::AppState::new(pool, config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "aleen portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
