use std::sync::Arc;

use laptop_catalog::pb::{
    Cpu, Filter, Laptop, LaptopServiceClient, Memory, MemoryUnit,
};
use laptop_catalog::service::grpc_server;
use laptop_catalog::{InMemoryImageStore, InMemoryLaptopStore, InMemoryRatingStore, LaptopServer};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;

pub type Client = LaptopServiceClient<tonic::transport::Channel>;

pub struct Running {
    pub client: Client,
    pub images: InMemoryImageStore,
    pub ratings: InMemoryRatingStore,
}

/// Bind to port 0, spawn the gRPC server over in-memory stores, and return a
/// connected client.
pub async fn start_server() -> Running {
    let laptops = InMemoryLaptopStore::new();
    let images = InMemoryImageStore::new();
    let ratings = InMemoryRatingStore::new();
    let server = LaptopServer::new(
        Arc::new(laptops),
        Arc::new(images.clone()),
        Arc::new(ratings.clone()),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let grpc_svc = grpc_server(server);
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(grpc_svc)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    let endpoint = format!("http://{addr}");
    let client = LaptopServiceClient::connect(endpoint).await.unwrap();
    Running {
        client,
        images,
        ratings,
    }
}

pub fn laptop(price_usd: f64, cores: u32, min_ghz: f64, ram_gb: u64) -> Laptop {
    Laptop {
        brand: "Apple".into(),
        name: "Macbook Pro".into(),
        cpu: Some(Cpu {
            brand: "Apple".into(),
            name: "M2".into(),
            number_cores: cores,
            number_threads: cores,
            min_ghz,
            max_ghz: min_ghz + 1.0,
        }),
        ram: Some(Memory::new(ram_gb, MemoryUnit::Gigabyte)),
        price_usd,
        release_year: 2023,
        ..Default::default()
    }
}

pub fn filter() -> Filter {
    Filter {
        max_price_usd: 3000.0,
        min_cpu_cores: 4,
        min_cpu_ghz: 2.5,
        min_ram: Some(Memory::new(8, MemoryUnit::Gigabyte)),
    }
}
