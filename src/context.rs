//! Per-call cancellation and deadline signal.
//!
//! Every RPC gets its own `CallContext`. Streaming loops poll it with
//! [`CallContext::check`] at each suspension point and abandon the call once
//! it fires.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, Notify};

/// Why a call was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupted::Cancelled => write!(f, "request is cancelled"),
            Interrupted::DeadlineExceeded => write!(f, "deadline is exceeded"),
        }
    }
}

impl std::error::Error for Interrupted {}

#[derive(Debug, Default)]
struct Signal {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation flag plus optional deadline, shared by every clone.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    signal: Arc<Signal>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never fires unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            signal: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Build a context from request metadata, honouring the `grpc-timeout` header.
    pub fn from_metadata(metadata: &tonic::metadata::MetadataMap) -> Self {
        let timeout = metadata
            .get("grpc-timeout")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout);

        match timeout {
            Some(timeout) => Self::with_timeout(timeout),
            None => Self::new(),
        }
    }

    pub fn cancel(&self) {
        self.signal.cancelled.store(true, Ordering::SeqCst);
        self.signal.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Ok(())` while the call may proceed. Cancellation wins over an expired deadline.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.signal.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drive `fut` unless the context fires first.
    ///
    /// Wraps every inbound receive of the streaming handlers.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }

    /// Cancel this context if the receiving half of `tx` is dropped, i.e. the
    /// caller stopped reading the response stream. Watching stops when the
    /// returned guard is dropped.
    pub fn cancel_on_close<T: Send + 'static>(&self, tx: &mpsc::Sender<T>) -> CloseWatch {
        let (done, finished) = oneshot::channel::<()>();
        let tx = tx.clone();
        let ctx = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => ctx.cancel(),
                _ = finished => {}
            }
        });

        CloseWatch { _done: done }
    }
}

/// Keeps a [`CallContext::cancel_on_close`] watcher alive.
pub struct CloseWatch {
    _done: oneshot::Sender<()>,
}

/// Parse a `grpc-timeout` value: at most 8 ASCII digits followed by one of
/// `H`, `M`, `S`, `m`, `u`, `n`.
fn parse_grpc_timeout(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.len() < 2 || !raw.is_ascii() {
        return None;
    }
    let (digits, unit) = raw.split_at(raw.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(value * 60 * 60)),
        "M" => Some(Duration::from_secs(value * 60)),
        "S" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_millis(value)),
        "u" => Some(Duration::from_micros(value)),
        "n" => Some(Duration::from_nanos(value)),
        _ => None,
    }
}
