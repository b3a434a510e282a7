//! gRPC transport integration tests.
//!
//! Starts a tonic server on an ephemeral port and exercises it with the
//! generated client.

mod support;
mod transport;
