use std::sync::Arc;

use laptop_catalog::service::{self, LaptopServer};
use laptop_catalog::{
    DiskImageStore, DiskLaptopStore, InMemoryLaptopStore, InMemoryRatingStore, LaptopStore,
    ServerConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(?config, "starting laptop server");

    let laptops: Arc<dyn LaptopStore> = match &config.catalog_dir {
        Some(dir) => Arc::new(DiskLaptopStore::open(dir)?),
        None => Arc::new(InMemoryLaptopStore::new()),
    };
    let images = Arc::new(DiskImageStore::open(&config.image_dir)?);
    let ratings = Arc::new(InMemoryRatingStore::new());

    let server = LaptopServer::new(laptops, images, ratings);
    service::serve_grpc(server, config.bind_addr).await?;
    Ok(())
}
