use auth_backend::{
    config::AppConfig,
    infrastructure::database::{connect, ensure_schema},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let db = connect(&config).await?;
    ensure_schema(&db).await?;

    info!("user store ready");
    Ok(())
}
