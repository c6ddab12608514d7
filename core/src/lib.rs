//! Blocking client for the legacy Todoist `/API/<name>` HTTP interface.
//!
//! # Overview
//! One method per remote operation: account, projects, labels, items, item
//! ordering and the query language. Parameters go out as query strings or
//! form bodies; responses come back as `serde_json::Value`.
//!
//! # Design
//! - `Api` is stateless. Its `build_*` methods produce `HttpRequest` values
//!   and enforce preconditions, so usage errors surface before any I/O.
//! - `Transport` executes a request. `UreqTransport` is the default
//!   (feature `ureq`); tests and embedders inject their own.
//! - `Client` owns the session token and the last error, and applies each
//!   endpoint's success marker to the raw body before decoding.
//! - Remote entities are not modeled; only request parameters are typed.
//!
//! ```no_run
//! use todoist_core::{Client, ClientConfig, NewItem};
//!
//! let mut client = Client::new(ClientConfig::from_env());
//! client.login("me@example.com", "secret")?;
//! let projects = client.get_projects()?;
//! let inbox = projects[0]["id"].as_u64().unwrap_or_default();
//! client.add_item(&NewItem {
//!     project_id: inbox,
//!     content: "Buy milk".to_string(),
//!     ..NewItem::default()
//! })?;
//! # Ok::<(), todoist_core::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use api::Api;
pub use client::Client;
pub use codec::{JsonCodec, SerdeJsonCodec};
pub use config::{ClientConfig, TransportOptions};
pub use error::{ApiError, TransportError, UsageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::IdList;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{ItemUpdate, NewItem, NewProject, ProjectUpdate, Query, Registration, UserUpdate};
