use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use payflow::adapters::{
    payment_routes, InMemoryTransactionStore, MyFatoorahClient, PaymentAppState,
    StaticProviderRegistry,
};
use payflow::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payflow=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::load()?;

    info!(
        provider = %config.gateway.name,
        environment = ?config.gateway.environment,
        country = %config.gateway.country,
        "starting payment service"
    );

    let state = PaymentAppState {
        store: Arc::new(InMemoryTransactionStore::new()),
        registry: Arc::new(StaticProviderRegistry::new(vec![config.gateway.clone()])),
        gateway: Arc::new(MyFatoorahClient::new()),
    };

    let app = payment_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    info!(%addr, base_url = %config.server.base_url, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
