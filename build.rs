fn main() {
    // Service definition is declared by hand (no `.proto` file); message types
    // live in `src/pb` as prost structs.
    let method = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(format!("crate::pb::{}", input))
            .output_type(format!("crate::pb::{}", output))
            .codec_path("tonic::codec::ProstCodec")
    };

    let service = tonic_build::manual::Service::builder()
        .name("LaptopService")
        .package("example.pcbook")
        .method(
            method(
                "create_laptop",
                "CreateLaptop",
                "CreateLaptopRequest",
                "CreateLaptopResponse",
            )
            .build(),
        )
        .method(
            method(
                "search_laptop",
                "SearchLaptop",
                "SearchLaptopRequest",
                "SearchLaptopResponse",
            )
            .server_streaming()
            .build(),
        )
        .method(
            method(
                "upload_image",
                "UploadImage",
                "UploadImageRequest",
                "UploadImageResponse",
            )
            .client_streaming()
            .build(),
        )
        .method(
            method(
                "rate_laptop",
                "RateLaptop",
                "RateLaptopRequest",
                "RateLaptopResponse",
            )
            .client_streaming()
            .server_streaming()
            .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
