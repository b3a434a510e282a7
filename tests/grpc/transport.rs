use laptop_catalog::pb::{
    CreateLaptopRequest, RateLaptopRequest, SearchLaptopRequest, UploadImageRequest,
};
use laptop_catalog::{ImageStore, RatingStore};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::support::{filter, laptop, start_server, Client};

async fn create(client: &mut Client, price: f64, cores: u32, ghz: f64, ram: u64) -> String {
    client
        .create_laptop(CreateLaptopRequest {
            laptop: Some(laptop(price, cores, ghz, ram)),
        })
        .await
        .unwrap()
        .into_inner()
        .id
}

#[tokio::test]
async fn create_assigns_uuid() {
    let mut running = start_server().await;

    let id = create(&mut running.client, 1500.0, 4, 2.5, 16).await;

    assert!(uuid::Uuid::parse_str(&id).is_ok());
}

#[tokio::test]
async fn create_rejects_invalid_id() {
    let mut running = start_server().await;
    let mut invalid = laptop(1500.0, 4, 2.5, 16);
    invalid.id = "not-a-uuid".into();

    let status = running
        .client
        .create_laptop(CreateLaptopRequest {
            laptop: Some(invalid),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn create_duplicate_is_already_exists() {
    let mut running = start_server().await;
    let mut first = laptop(1500.0, 4, 2.5, 16);
    first.id = uuid::Uuid::new_v4().to_string();

    running
        .client
        .create_laptop(CreateLaptopRequest {
            laptop: Some(first.clone()),
        })
        .await
        .unwrap();
    let status = running
        .client
        .create_laptop(CreateLaptopRequest { laptop: Some(first) })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::AlreadyExists);
}

#[tokio::test]
async fn create_without_laptop_is_invalid_argument() {
    let mut running = start_server().await;

    let status = running
        .client
        .create_laptop(CreateLaptopRequest { laptop: None })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn search_streams_matches() {
    let mut running = start_server().await;
    let client = &mut running.client;
    create(client, 3500.0, 4, 2.5, 16).await;
    create(client, 2500.0, 2, 2.5, 16).await;
    let cheap = create(client, 1999.0, 4, 2.5, 16).await;
    let fast = create(client, 2000.0, 6, 2.8, 64).await;

    let mut stream = client
        .search_laptop(SearchLaptopRequest {
            filter: Some(filter()),
        })
        .await
        .unwrap()
        .into_inner();

    let mut found = Vec::new();
    while let Some(response) = stream.next().await {
        found.push(response.unwrap().laptop.unwrap().id);
    }
    found.sort();
    let mut expected = vec![cheap, fast];
    expected.sort();

    assert_eq!(found, expected);
}

#[tokio::test]
async fn upload_stores_chunks() {
    let mut running = start_server().await;
    let laptop_id = create(&mut running.client, 1500.0, 4, 2.5, 16).await;

    let mut requests = vec![UploadImageRequest::info(laptop_id.as_str(), ".jpg")];
    requests.extend((0..8).map(|_| UploadImageRequest::chunk(vec![7u8; 1024])));

    let response = running
        .client
        .upload_image(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.size, 8 * 1024);
    let record = running.images.find(&response.id).unwrap().unwrap();
    assert_eq!(record.laptop_id, laptop_id);
}

#[tokio::test]
async fn oversize_upload_is_invalid_argument() {
    let mut running = start_server().await;
    let laptop_id = create(&mut running.client, 1500.0, 4, 2.5, 16).await;

    let mut requests = vec![UploadImageRequest::info(laptop_id.as_str(), ".png")];
    requests.extend((0..1025).map(|_| UploadImageRequest::chunk(vec![0u8; 1024])));

    let status = running
        .client
        .upload_image(tokio_stream::iter(requests))
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::InvalidArgument);
    assert!(running.images.is_empty().unwrap());
}

#[tokio::test]
async fn rate_exchanges_one_response_per_request() {
    let mut running = start_server().await;
    let laptop_id = create(&mut running.client, 1500.0, 4, 2.5, 16).await;

    let (tx, rx) = mpsc::channel(1);
    let mut responses = running
        .client
        .rate_laptop(ReceiverStream::new(rx))
        .await
        .unwrap()
        .into_inner();

    let mut seen = Vec::new();
    for score in [8.0, 7.5, 10.0] {
        tx.send(RateLaptopRequest {
            laptop_id: laptop_id.clone(),
            score,
        })
        .await
        .unwrap();
        let response = responses.next().await.unwrap().unwrap();
        seen.push((response.rated_count, response.average_score));
    }
    drop(tx);

    assert_eq!(seen, vec![(1, 8.0), (2, 7.75), (3, 8.5)]);
    assert!(responses.next().await.is_none());
    assert_eq!(running.ratings.find(&laptop_id).unwrap().unwrap().count, 3);
}

#[tokio::test]
async fn rating_unknown_laptop_is_not_found() {
    let mut running = start_server().await;

    let requests = tokio_stream::iter(vec![RateLaptopRequest {
        laptop_id: uuid::Uuid::new_v4().to_string(),
        score: 5.0,
    }]);
    let mut responses = running
        .client
        .rate_laptop(requests)
        .await
        .unwrap()
        .into_inner();

    let status = responses.next().await.unwrap().unwrap_err();
    assert_eq!(status.code(), tonic::Code::NotFound);
}
