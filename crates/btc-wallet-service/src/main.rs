use btc_wallet_service::{ServiceConfig, WalletFacade};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;
    let facade = WalletFacade::new(&config)?;

    let height = facade.block_count()?;
    tracing::info!(height, network = %config.network, "wallet service collaborators wired up");

    Ok(())
}
