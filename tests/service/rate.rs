use std::time::Duration;

use laptop_catalog::pb::{RateLaptopRequest, RateLaptopResponse};
use laptop_catalog::{CallContext, RatingStore, ServiceError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::support::{disk_harness, harness, new_laptop};

type Inbound = Result<RateLaptopRequest, &'static str>;

fn rate(laptop_id: &str, score: f64) -> Inbound {
    Ok(RateLaptopRequest {
        laptop_id: laptop_id.to_string(),
        score,
    })
}

async fn collect(
    mut rx: mpsc::Receiver<Result<RateLaptopResponse, ServiceError>>,
) -> Vec<Result<RateLaptopResponse, ServiceError>> {
    let mut out = Vec::new();
    while let Some(item) = rx.recv().await {
        out.push(item);
    }
    out
}

#[tokio::test]
async fn ratings_are_answered_in_order() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let requests = tokio_stream::iter(vec![rate(&id, 8.0), rate(&id, 7.5), rate(&id, 10.0)]);

    let responses = collect(h.server.rate_laptop(CallContext::new(), requests)).await;

    let got: Vec<(u32, f64)> = responses
        .into_iter()
        .map(|r| r.unwrap())
        .map(|r| {
            assert_eq!(r.laptop_id, id);
            (r.rated_count, r.average_score)
        })
        .collect();
    assert_eq!(got, vec![(1, 8.0), (2, 7.75), (3, 8.5)]);

    let stored = h.ratings.find(&id).unwrap().unwrap();
    assert_eq!(stored.count, 3);
}

#[tokio::test]
async fn unknown_laptop_ends_exchange_after_earlier_responses() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let unknown = uuid::Uuid::new_v4().to_string();
    let requests = tokio_stream::iter(vec![
        rate(&id, 9.0),
        rate(&unknown, 5.0),
        rate(&id, 1.0),
    ]);

    let responses = collect(h.server.rate_laptop(CallContext::new(), requests)).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].as_ref().unwrap().rated_count, 1);
    let err = responses[1].as_ref().unwrap_err();
    assert_eq!(err.code(), tonic::Code::NotFound);
    assert_eq!(h.ratings.find(&id).unwrap().unwrap().count, 1);
    assert!(h.ratings.find(&unknown).unwrap().is_none());
}

#[tokio::test]
async fn empty_exchange_closes_cleanly() {
    let h = harness();

    let responses = collect(
        h.server
            .rate_laptop(CallContext::new(), tokio_stream::iter(Vec::<Inbound>::new())),
    )
    .await;

    assert!(responses.is_empty());
}

#[tokio::test]
async fn responses_interleave_with_requests() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let (req_tx, req_rx) = mpsc::channel::<Inbound>(1);
    let mut responses = h
        .server
        .rate_laptop(CallContext::new(), ReceiverStream::new(req_rx));

    for (n, score) in [6.0, 8.0, 10.0].into_iter().enumerate() {
        req_tx.send(rate(&id, score)).await.unwrap();
        let response = responses.recv().await.unwrap().unwrap();
        assert_eq!(response.rated_count as usize, n + 1);
    }
    drop(req_tx);

    assert!(responses.recv().await.is_none());
    assert_eq!(h.ratings.find(&id).unwrap().unwrap().average(), 8.0);
}

#[tokio::test]
async fn concurrent_sessions_all_count() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();

    let mut sessions = Vec::new();
    for _ in 0..20 {
        let server = h.server.clone();
        let id = id.clone();
        sessions.push(tokio::spawn(async move {
            let requests = tokio_stream::iter(vec![rate(&id, 5.0)]);
            collect(server.rate_laptop(CallContext::new(), requests)).await
        }));
    }

    let mut counts = Vec::new();
    for session in sessions {
        let responses = session.await.unwrap();
        assert_eq!(responses.len(), 1);
        counts.push(responses[0].as_ref().unwrap().rated_count);
    }
    counts.sort_unstable();

    assert_eq!(counts, (1..=20).collect::<Vec<u32>>());
    assert_eq!(h.ratings.find(&id).unwrap().unwrap().count, 20);
}

#[tokio::test]
async fn cancelled_exchange_ends_with_cancelled() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let requests = tokio_stream::iter(vec![rate(&id, 7.0)]).chain(tokio_stream::pending());
    let ctx = CallContext::new();
    let mut responses = h.server.rate_laptop(ctx.clone(), requests);

    assert_eq!(responses.recv().await.unwrap().unwrap().rated_count, 1);
    ctx.cancel();

    let last = tokio::time::timeout(Duration::from_secs(5), responses.recv())
        .await
        .unwrap();
    assert_eq!(last, Some(Err(ServiceError::Cancelled)));
}

#[tokio::test]
async fn stalled_rating_hits_the_deadline() {
    let h = harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let requests = tokio_stream::iter(vec![rate(&id, 7.0)]).chain(tokio_stream::pending());
    let ctx = CallContext::with_timeout(Duration::from_millis(50));

    let responses = tokio::time::timeout(
        Duration::from_secs(5),
        collect(h.server.rate_laptop(ctx, requests)),
    )
    .await
    .expect("exchange did not stop at the deadline");

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].as_ref().unwrap().rated_count, 1);
    assert_eq!(responses[1], Err(ServiceError::DeadlineExceeded));
}

#[tokio::test]
async fn ratings_over_disk_catalog() {
    let h = disk_harness();
    let id = h.server.create_laptop(&CallContext::new(), new_laptop()).unwrap();
    let unknown = uuid::Uuid::new_v4().to_string();
    let requests = tokio_stream::iter(vec![rate(&id, 4.0), rate(&id, 6.0), rate(&unknown, 1.0)]);

    let responses = collect(h.server.rate_laptop(CallContext::new(), requests)).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1].as_ref().unwrap().average_score, 5.0);
    assert_eq!(responses[2].as_ref().unwrap_err().code(), tonic::Code::NotFound);
}
