//! `layered-http` is an async HTTP client with layered default headers and
//! per-request retry.
//!
//! Headers for each call are resolved from four layers, later ones winning:
//! client base headers, headers common to all methods, headers for the
//! request's method, and the call's own headers. See [`resolve_headers`].
//!
//! Verb methods return [`Result`]; a request whose config sets `retry` is
//! resubmitted after `retry_delay_ms` until it succeeds or the retry budget
//! is spent:
//! - [`HttpClient::get`]
//! - [`HttpClient::post`]
//! - [`HttpClient::put`]
//! - [`HttpClient::delete`]

mod body;
mod client;
mod config;
mod error;
mod headers;
mod method;
mod options;
mod progress;
mod response;
mod retry;

pub use client::{create_client, HttpClient, PreparedRequest};
pub use config::{
    resolve_config, DefaultConfig, RequestConfig, RequestOptions, DEFAULT_RETRY_DELAY_MS,
};
pub use error::HttpError;
pub use headers::{resolve_headers, DefaultHeaders, HeaderSet};
pub use method::Method;
pub use options::ClientOptions;
pub use progress::ProgressObserver;
pub use response::{
    normalize, NormalizedResponse, Response, LOCAL_FAILURE_STATUS, NETWORK_FAILURE_STATUS,
};
pub use retry::{check_retry, Attempt, RetryDecision, RetryPolicy};

pub type Result<T> = std::result::Result<T, HttpError>;
