mod app;
mod checkout;
mod config;
mod error;
mod menu;
mod orders;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "catering=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init()?;
    tracing::info!(
        location_id = %app_state.config.square.location_id,
        api = %app_state.config.square.api_base_url,
        token = %app_state.config.square.token_hint(),
        "payment provider configured"
    );

    app::spawn_credential_check(&app_state);

    let app = app::build_app(app_state);
    app::serve(app).await
}
