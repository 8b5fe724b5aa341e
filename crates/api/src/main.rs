use mentara_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mentara_observability::init();

    let config = ApiConfig::from_env()?;
    let store = mentara_api::app::load_store(config.seed_file.as_deref())?;
    let app = mentara_api::app::build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
