use pitstop_infra::{Shop, ShopConfig, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pitstop_observability::init();

    let config = ShopConfig::from_env()?;
    let store = open_store(&config)?;
    let shop = Shop::new(store, config.tax_rate);

    let app = pitstop_api::app::build_app(shop);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(tax_rate = %config.tax_rate, "listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
