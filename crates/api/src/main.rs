use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroute_observability::init();

    let config = stockroute_api::config::AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();

    let app = stockroute_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
