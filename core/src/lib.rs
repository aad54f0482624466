//! Client core for the recycling rewards app.
//!
//! # Overview
//! Builds requests for the recycling backend, classifies its responses into
//! typed payloads or `ApiError`s, and hands the UI layer uniform
//! `{success, data|error}` envelopes. Also owns the small pieces of
//! on-device state: the signed-in user, sound preferences and the cache of
//! loaded sound effects.
//!
//! # Design
//! - `RecycleClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. Whoever holds a `Transport` (or
//!   the host across the FFI) performs the I/O in between.
//! - `ApiService` joins the two through a `Transport` and never fails; every
//!   call resolves to an `Envelope`.
//! - Session and preference state go through `KeyValueStore`, so the host
//!   decides where bytes live.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod audio;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod preferences;
pub mod services;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use client::RecycleClient;
pub use config::ClientConfig;
pub use dispatch::{Dispatcher, RequestOptions};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorKind, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use services::ApiService;
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use transport::Transport;
#[cfg(feature = "blocking")]
pub use transport::UreqTransport;
pub use types::{
    Approval, Credentials, ImageUpload, LoginResponse, NewRecycling, PendingRequests, Ranking,
    RankingEntry, RecyclingRequest, Rejection, RequestStatus, ReviewedRequest, Role, UploadedImage,
    User, UserProfile, UserUpdate,
};
