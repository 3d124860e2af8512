//! Synchronous client for the Petfinder animal-shelter directory API.
//!
//! # Overview
//! The upstream answers in a loosely typed JSON dialect: every scalar is
//! wrapped as `{"$t": value}` and a result set is a bare object when it holds
//! one item and an array otherwise. This crate turns those bodies into plain
//! `Pet` and `Shelter` records and sends requests through a transport that
//! retries connection-level failures with bounded exponential backoff.
//!
//! # Design
//! - `PetfinderClient` is stateless; each operation is split into `build_*`
//!   (validate options, produce an `HttpRequest`) and `parse_*` (decode and map
//!   an `HttpResponse`), so the I/O boundary is explicit.
//! - `Petfinder` chains build → `Retrying` transport → decode → map for callers
//!   that want one call per operation.
//! - `wire` owns the upstream's shape quirks; `mapper` converts wire records
//!   into domain types and never fails.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
mod mapper;
pub mod options;
pub mod retry;
pub mod transport;
pub mod types;
pub mod wire;

pub use api::Petfinder;
pub use client::{Operation, PetfinderClient};
pub use config::ClientConfig;
pub use error::{DecodeError, PetfinderError, TransportError, TransportErrorKind, UpstreamStatus};
pub use http::{HttpRequest, HttpResponse};
pub use options::{Age, Animal, OutputLevel, PetStatus, RequestOptions, Sex, Size};
pub use retry::{RetryPolicy, Retrying, Sleep, ThreadSleep};
pub use transport::{Transport, UreqTransport};
pub use types::{Contact, Pet, Photo, Shelter};
