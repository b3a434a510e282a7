//! Laptop catalog service.
//!
//! Three concurrency-safe stores (catalog, images, ratings) behind a
//! [`service::LaptopServer`] that implements four operations: unary
//! `CreateLaptop`, server-streaming `SearchLaptop`, client-streaming
//! `UploadImage` and bidirectional `RateLaptop`. The gRPC binding lives in
//! [`service::grpc`].

pub mod catalog;
pub mod config;
pub mod context;
mod error;
pub mod image;
pub mod pb;
pub mod rating;
pub mod service;

pub use catalog::{DiskLaptopStore, InMemoryLaptopStore, LaptopStore};
pub use config::ServerConfig;
pub use context::{CallContext, Interrupted};
pub use error::StoreError;
pub use image::{DiskImageStore, ImageRecord, ImageStore, InMemoryImageStore};
pub use rating::{InMemoryRatingStore, Rating, RatingStore};
pub use service::{LaptopServer, ServiceError};
