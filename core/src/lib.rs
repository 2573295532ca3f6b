//! Synchronous client for the Smartling Files API.
//!
//! # Overview
//! `FileApiClient` exposes one method per Files API operation (upload,
//! download, status, list, rename, delete, import, authorized locales,
//! last-modified). All of them run through one pipeline that encodes
//! parameters, attaches the bearer token, executes the request and unwraps
//! the `{"response": {...}}` envelope into a `serde_json::Value` or an
//! `ApiError`.
//!
//! # Design
//! - Token handling sits behind `AuthProvider`; `TokenProvider` signs in with
//!   user credentials and caches the token. A 401 resets it.
//! - Network I/O sits behind `HttpExecutor`; `ReqwestExecutor` is the default.
//!   Requests and responses are plain owned data, so the pipeline is testable
//!   with scripted executors.
//! - Per-operation option structs flatten into `Params` at the call site.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{AuthProvider, StaticToken, TokenProvider};
pub use client::{FileApiClient, DEFAULT_BASE_URL};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use form::{FilePart, MultipartForm};
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use params::{ParamValue, Params};
pub use transport::ReqwestExecutor;
pub use types::{
    DownloadParameters, FileType, LastModifiedParameters, ListParameters, RetrievalType, TranslationState,
    UploadParameters,
};
