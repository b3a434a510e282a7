//! LaptopServer - the four catalog operations, independent of the transport.
//!
//! Inbound streams are any `Stream` of decoded messages; outbound streams are
//! receivers the transport forwards to the caller. Search results are pulled
//! one at a time through a [`MatchReceiver`]. All shared state
//! lives in the three stores.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::catalog::LaptopStore;
use crate::context::CallContext;
use crate::image::ImageStore;
use crate::pb::{
    Filter, Laptop, RateLaptopRequest, RateLaptopResponse, SearchLaptopResponse,
    UploadImageRequest, UploadImageResponse,
};
use crate::rating::RatingStore;

use super::error::ServiceError;
use super::rate::RateSession;
use super::upload::{ImageUpload, MAX_IMAGE_SIZE};

/// Outbound messages buffered per streaming call before the producer waits.
const STREAM_BUFFER: usize = 1;

/// Outbound half of a streaming call.
pub type ResponseReceiver<T> = mpsc::Receiver<Result<T, ServiceError>>;

#[derive(Clone)]
pub struct LaptopServer {
    laptops: Arc<dyn LaptopStore>,
    images: Arc<dyn ImageStore>,
    ratings: Arc<dyn RatingStore>,
}

impl LaptopServer {
    pub fn new(
        laptops: Arc<dyn LaptopStore>,
        images: Arc<dyn ImageStore>,
        ratings: Arc<dyn RatingStore>,
    ) -> Self {
        Self {
            laptops,
            images,
            ratings,
        }
    }

    /// Store a laptop, generating a UUID if it has no id. Returns the final id,
    /// always in lowercase hyphenated form.
    pub fn create_laptop(
        &self,
        ctx: &CallContext,
        mut laptop: Laptop,
    ) -> Result<String, ServiceError> {
        info!(id = %laptop.id, "received a create-laptop request");

        laptop.id = if laptop.id.is_empty() {
            uuid::Uuid::new_v4().hyphenated().to_string()
        } else {
            canonical_id(&laptop.id).map_err(ServiceError::logged)?
        };

        ctx.check().map_err(|reason| ServiceError::from(reason).logged())?;

        self.laptops.save(&laptop).map_err(|e| {
            ServiceError::from_store("cannot save laptop to the store", e).logged()
        })?;

        info!(id = %laptop.id, "saved laptop");
        Ok(laptop.id)
    }

    /// Stream every laptop matching `filter`, one message per match.
    ///
    /// The scan runs on the blocking pool and only looks for the next match
    /// when the caller asks for one through [`MatchReceiver::recv`], so
    /// nothing is produced ahead of the caller. A failure ends the stream
    /// with one `Err`.
    pub fn search_laptop(&self, ctx: CallContext, filter: Filter) -> MatchReceiver {
        info!(?filter, "received a search-laptop request");

        let (demand_tx, demand_rx) = mpsc::channel(1);
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let watch = ctx.cancel_on_close(&tx);
        let laptops = Arc::clone(&self.laptops);
        let runtime = Handle::current();

        tokio::task::spawn_blocking(move || {
            let _watch = watch;
            let mut handoff = Handoff {
                runtime,
                ctx: &ctx,
                demand: demand_rx,
                tx: &tx,
            };
            match send_matches(&*laptops, &filter, &mut handoff) {
                Ok(sent) => debug!(sent, "search finished"),
                Err(err) => {
                    let _ = tx.blocking_send(Err(err.logged()));
                }
            }
        });

        MatchReceiver {
            demand: demand_tx,
            matches: rx,
        }
    }

    /// Assemble an uploaded image and store it once the caller closes the stream.
    pub async fn upload_image<S, E>(
        &self,
        ctx: &CallContext,
        mut requests: S,
    ) -> Result<UploadImageResponse, ServiceError>
    where
        S: Stream<Item = Result<UploadImageRequest, E>> + Unpin,
        E: fmt::Display,
    {
        let mut upload = ImageUpload::new(MAX_IMAGE_SIZE);

        let first = match ctx.run(requests.next()).await {
            Err(reason) => return Err(ServiceError::from(reason).logged()),
            Ok(Some(Ok(request))) => request,
            Ok(Some(Err(err))) => {
                let msg = format!("cannot receive image info: {}", err);
                return Err(ServiceError::Unknown(msg).logged());
            }
            Ok(None) => {
                let msg = "cannot receive image info: stream closed".to_string();
                return Err(ServiceError::Unknown(msg).logged());
            }
        };
        upload.receive(first).map_err(ServiceError::logged)?;

        let (laptop_id, image_type) = match upload.info() {
            Some(info) => (info.laptop_id.clone(), info.image_type.clone()),
            None => return Err(ServiceError::Unknown("cannot receive image info".into()).logged()),
        };
        info!(laptop_id = %laptop_id, image_type = %image_type, "received an upload-image request");

        let laptop = self
            .laptops
            .find(&laptop_id)
            .map_err(|e| ServiceError::from_store("cannot find laptop", e).logged())?;
        if laptop.is_none() {
            let msg = format!("laptop {} doesn't exist", laptop_id);
            return Err(ServiceError::InvalidArgument(msg).logged());
        }

        loop {
            debug!("waiting to receive more data");
            let request = match ctx.run(requests.next()).await {
                Err(reason) => return Err(ServiceError::from(reason).logged()),
                Ok(None) => {
                    debug!("no more data");
                    break;
                }
                Ok(Some(Err(err))) => {
                    let msg = format!("cannot receive chunk data: {}", err);
                    return Err(ServiceError::Unknown(msg).logged());
                }
                Ok(Some(Ok(request))) => request,
            };

            ctx.check().map_err(|reason| ServiceError::from(reason).logged())?;
            upload.receive(request).map_err(ServiceError::logged)?;
            debug!(size = upload.size(), "received a chunk");
        }

        let (info, data) = upload.finish().map_err(ServiceError::logged)?;
        let size = u32::try_from(data.len())
            .map_err(|_| ServiceError::Internal("image size overflows u32".into()).logged())?;

        let record = self
            .images
            .save(&info.laptop_id, &info.image_type, data)
            .map_err(|e| {
                ServiceError::from_store("cannot save image to the store", e).logged()
            })?;

        info!(id = %record.id, laptop_id = %record.laptop_id, size, "saved image");
        Ok(UploadImageResponse {
            id: record.id,
            size,
        })
    }

    /// Answer every rating request with the laptop's updated count and
    /// average, in receive order. The output closes after the caller closes
    /// its side and the last response is queued.
    pub fn rate_laptop<S, E>(
        &self,
        ctx: CallContext,
        requests: S,
    ) -> ResponseReceiver<RateLaptopResponse>
    where
        S: Stream<Item = Result<RateLaptopRequest, E>> + Unpin + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let server = self.clone();

        tokio::spawn(async move {
            let _watch = ctx.cancel_on_close(&tx);
            if let Err(err) = server.drive_ratings(&ctx, requests, &tx).await {
                let _ = tx.send(Err(err)).await;
            }
        });

        rx
    }

    async fn drive_ratings<S, E>(
        &self,
        ctx: &CallContext,
        mut requests: S,
        tx: &mpsc::Sender<Result<RateLaptopResponse, ServiceError>>,
    ) -> Result<(), ServiceError>
    where
        S: Stream<Item = Result<RateLaptopRequest, E>> + Unpin,
        E: fmt::Display,
    {
        let mut session = RateSession::new();

        loop {
            let request = match ctx.run(requests.next()).await {
                Err(reason) => return Err(ServiceError::from(reason).logged()),
                Ok(None) => {
                    debug!("no more data");
                    break;
                }
                Ok(Some(Err(err))) => {
                    let msg = format!("cannot receive stream request: {}", err);
                    return Err(ServiceError::Unknown(msg).logged());
                }
                Ok(Some(Ok(request))) => request,
            };

            let response = session
                .rate(ctx, &*self.laptops, &*self.ratings, request)
                .map_err(ServiceError::logged)?;

            if tx.send(Ok(response)).await.is_err() {
                let msg = "cannot send response: caller went away".to_string();
                return Err(ServiceError::Unknown(msg).logged());
            }
        }

        session.drain();
        Ok(())
    }
}

/// Any accepted UUID spelling (braced, urn, simple, uppercase) maps to one
/// stored id.
fn canonical_id(raw: &str) -> Result<String, ServiceError> {
    uuid::Uuid::parse_str(raw)
        .map(|id| id.hyphenated().to_string())
        .map_err(|err| {
            ServiceError::InvalidArgument(format!("laptop id is not a valid UUID: {}", err))
        })
}

/// Outbound half of `SearchLaptop`.
///
/// Every [`recv`](Self::recv) asks the scan for exactly one more message.
pub struct MatchReceiver {
    demand: mpsc::Sender<()>,
    matches: mpsc::Receiver<Result<SearchLaptopResponse, ServiceError>>,
}

impl MatchReceiver {
    /// Next match, the terminal error, or `None` once the search is over.
    pub async fn recv(&mut self) -> Option<Result<SearchLaptopResponse, ServiceError>> {
        // A closed demand channel means the scan already stopped; whatever
        // it queued last is still readable.
        let _ = self.demand.send(()).await;
        self.matches.recv().await
    }
}

/// The scan's side of the exchange with a [`MatchReceiver`].
struct Handoff<'a> {
    runtime: Handle,
    ctx: &'a CallContext,
    demand: mpsc::Receiver<()>,
    tx: &'a mpsc::Sender<Result<SearchLaptopResponse, ServiceError>>,
}

impl Handoff<'_> {
    /// Block until the caller asks for another match. `Ok(false)` means the
    /// caller went away.
    fn wait_for_demand(&mut self) -> Result<bool, ServiceError> {
        let ctx = self.ctx;
        let demand = &mut self.demand;
        let asked = self.runtime.block_on(ctx.run(demand.recv()))?;
        ctx.check()?;
        Ok(asked.is_some())
    }

    fn send(&self, laptop: Laptop) -> Result<(), ServiceError> {
        let response = SearchLaptopResponse {
            laptop: Some(laptop),
        };
        self.tx.blocking_send(Ok(response)).map_err(|_| {
            ServiceError::Unknown("cannot send response: caller went away".into())
        })
    }
}

fn send_matches(
    laptops: &dyn LaptopStore,
    filter: &Filter,
    handoff: &mut Handoff<'_>,
) -> Result<usize, ServiceError> {
    let mut matches = laptops
        .search(handoff.ctx, filter)
        .map_err(|e| ServiceError::from_store("cannot search laptops", e))?;

    let mut sent = 0;
    loop {
        if !handoff.wait_for_demand()? {
            debug!("caller stopped reading");
            return Ok(sent);
        }
        let laptop = match matches.next() {
            None => return Ok(sent),
            Some(found) => {
                found.map_err(|e| ServiceError::from_store("cannot search laptops", e))?
            }
        };

        let id = laptop.id.clone();
        handoff.send(laptop)?;
        debug!(id = %id, "sent laptop");
        sent += 1;
    }
}
