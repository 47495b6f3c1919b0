use blueprint_api::config::{ApiConfig, build_resolver};
use blueprint_api::routes;
use blueprint_api::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ApiConfig::from_env();
    let resolver = build_resolver(&config).unwrap_or_else(|e| {
        eprintln!("failed to load schemas: {e}");
        std::process::exit(1);
    });

    let state = AppState::new(resolver, &config.nonce);
    let app = routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("failed to bind {}: {e}", config.addr);
            std::process::exit(1);
        });

    tracing::info!(
        "blueprint-api listening on {} (rest base: {})",
        config.addr,
        config.rest_base
    );
    axum::serve(listener, app).await.unwrap();
}
