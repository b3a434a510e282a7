//! gRPC transport for the laptop service.
//!
//! Uses tonic for the server and prost for message serialization (standard
//! protobuf wire format, no `.proto` file). The generated `LaptopService`
//! trait is implemented by [`GrpcHandler`], a thin adapter over
//! [`LaptopServer`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use laptop_catalog::catalog::InMemoryLaptopStore;
//! use laptop_catalog::image::DiskImageStore;
//! use laptop_catalog::rating::InMemoryRatingStore;
//! use laptop_catalog::service::{self, LaptopServer};
//!
//! let server = LaptopServer::new(
//!     Arc::new(InMemoryLaptopStore::new()),
//!     Arc::new(DiskImageStore::open("img")?),
//!     Arc::new(InMemoryRatingStore::new()),
//! );
//!
//! // Compose with other tonic routes
//! let grpc_svc = service::grpc_server(server.clone());
//!
//! // Or serve directly
//! service::serve_grpc(server, "[::1]:8080".parse()?).await?;
//! ```

use std::net::SocketAddr;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};

use crate::context::CallContext;
use crate::pb::{
    CreateLaptopRequest, CreateLaptopResponse, LaptopService, LaptopServiceServer,
    RateLaptopRequest, RateLaptopResponse, SearchLaptopRequest, SearchLaptopResponse,
    UploadImageRequest, UploadImageResponse,
};

use super::error::ServiceError;
use super::server::{LaptopServer, MatchReceiver, ResponseReceiver};

/// Boxed response stream handed to tonic.
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// Implements the generated `LaptopService` trait on top of a `LaptopServer`.
pub struct GrpcHandler {
    server: LaptopServer,
}

impl GrpcHandler {
    pub fn new(server: LaptopServer) -> Self {
        Self { server }
    }
}

fn into_stream<T: Send + 'static>(rx: ResponseReceiver<T>) -> ResponseStream<T> {
    Box::pin(ReceiverStream::new(rx).map(|item| item.map_err(Status::from)))
}

/// Pull matches one at a time, asking for the next only after tonic has
/// taken the previous one.
fn match_stream(mut matches: MatchReceiver) -> ResponseStream<SearchLaptopResponse> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        loop {
            let permit = match tx.reserve().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            match matches.recv().await {
                Some(item) => permit.send(item),
                None => break,
            }
        }
    });
    into_stream(rx)
}

#[tonic::async_trait]
impl LaptopService for GrpcHandler {
    async fn create_laptop(
        &self,
        request: Request<CreateLaptopRequest>,
    ) -> Result<Response<CreateLaptopResponse>, Status> {
        let ctx = CallContext::from_metadata(request.metadata());
        let laptop = request.into_inner().laptop.ok_or_else(|| {
            Status::from(ServiceError::InvalidArgument("missing laptop".into()).logged())
        })?;

        let id = self.server.create_laptop(&ctx, laptop)?;
        Ok(Response::new(CreateLaptopResponse { id }))
    }

    type SearchLaptopStream = ResponseStream<SearchLaptopResponse>;

    async fn search_laptop(
        &self,
        request: Request<SearchLaptopRequest>,
    ) -> Result<Response<Self::SearchLaptopStream>, Status> {
        let ctx = CallContext::from_metadata(request.metadata());
        let filter = request.into_inner().filter.unwrap_or_default();

        let matches = self.server.search_laptop(ctx, filter);
        Ok(Response::new(match_stream(matches)))
    }

    async fn upload_image(
        &self,
        request: Request<Streaming<UploadImageRequest>>,
    ) -> Result<Response<UploadImageResponse>, Status> {
        let ctx = CallContext::from_metadata(request.metadata());
        let requests = request.into_inner();

        let response = self.server.upload_image(&ctx, requests).await?;
        Ok(Response::new(response))
    }

    type RateLaptopStream = ResponseStream<RateLaptopResponse>;

    async fn rate_laptop(
        &self,
        request: Request<Streaming<RateLaptopRequest>>,
    ) -> Result<Response<Self::RateLaptopStream>, Status> {
        let ctx = CallContext::from_metadata(request.metadata());
        let requests = request.into_inner();

        let rx = self.server.rate_laptop(ctx, requests);
        Ok(Response::new(into_stream(rx)))
    }
}

/// Create a `LaptopServiceServer` from a `LaptopServer`.
pub fn grpc_server(server: LaptopServer) -> LaptopServiceServer<GrpcHandler> {
    LaptopServiceServer::new(GrpcHandler::new(server))
}

/// Bind and serve the gRPC transport at `addr` until the process exits.
pub async fn serve_grpc(
    server: LaptopServer,
    addr: SocketAddr,
) -> Result<(), tonic::transport::Error> {
    tracing::info!(%addr, "serving laptop service");
    tonic::transport::Server::builder()
        .add_service(grpc_server(server))
        .serve(addr)
        .await
}
