use goal_ledger::{load_data, persist_data, router, seed, AppState, Config};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut data = load_data(&config.data_path).await?;
    let goals = seed::load_seed(config.seed_path.as_deref()).await?;
    if seed::seed_if_empty(&mut data, &goals) > 0 {
        persist_data(&config.data_path, &data).await?;
    }
    info!(
        goals = data.goals.len(),
        entries = data.entries.len(),
        path = %config.data_path.display(),
        "ledger loaded"
    );

    let addr = config.addr();
    let state = AppState::new(config.data_path, config.password, data);
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
