//! Client-side request pipeline for the kanri backend.
//!
//! `HttpClient` performs one network call and classifies the outcome.
//! `RequestHook` sits on top of any `Transport`, tracks loading/error state,
//! emits notices, and hands failures to an `ErrorBoundary`.

pub mod admin;
pub mod client;
pub mod error;
pub mod notify;
pub mod request;
pub mod transport;

pub use admin::AdminApi;
pub use client::{Anonymous, HttpClient, TokenProvider, REQUEST_TIMEOUT};
pub use error::{ApiError, NormalizedError};
pub use notify::{ErrorBoundary, Notice, NoticeKind, Notifier};
pub use request::{RequestHook, RequestOptions, RequestStatus};
pub use transport::{ApiRequest, ApiResponse, ContentType, FormPart, Method, RequestBody, Transport};
