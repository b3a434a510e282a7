//! Wire types for the `example.pcbook.LaptopService` gRPC service.
//!
//! Messages are plain prost structs (standard protobuf wire format, no
//! `.proto` file). The service trait, server and client are generated by
//! `build.rs` with `tonic_build::manual`.

mod laptop;
mod service;

pub use laptop::{
    Cpu, Filter, Gpu, Keyboard, KeyboardLayout, Laptop, Memory, MemoryUnit, Screen, ScreenPanel,
    Storage, StorageDriver,
};
pub use service::{
    upload_image_request, CreateLaptopRequest, CreateLaptopResponse, ImageInfo,
    RateLaptopRequest, RateLaptopResponse, SearchLaptopRequest, SearchLaptopResponse,
    UploadImageRequest, UploadImageResponse,
};

include!(concat!(env!("OUT_DIR"), "/example.pcbook.LaptopService.rs"));

pub use laptop_service_client::LaptopServiceClient;
pub use laptop_service_server::{LaptopService, LaptopServiceServer};
