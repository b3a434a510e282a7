//! The laptop service: operations, their error taxonomy, the streaming
//! state machines, and the gRPC binding.

mod error;
pub mod grpc;
mod rate;
mod server;
mod upload;

pub use error::ServiceError;
pub use grpc::{grpc_server, serve_grpc, GrpcHandler};
pub use rate::{RateSession, RateState};
pub use server::{LaptopServer, MatchReceiver, ResponseReceiver};
pub use upload::{ImageUpload, UploadState, MAX_IMAGE_SIZE};
