//! # vitals-api
//!
//! HTTP surface of the Vitals services, built on `axum`.
//!
//! [`PatientApi`] and [`PremiumApi`] hold their collaborators as shared
//! router state and turn into an [`axum::Router`] with `router()`. The
//! `vitals` CLI either serves a router or calls it in-process through
//! `tower::ServiceExt::oneshot`.
//!
//! Every request runs inside a tracing span with a fresh v4 request id,
//! also returned in the `x-request-id` header. Core errors become responses
//! through [`ApiError`]; see [`error`] for the status table.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use vitals_api::PatientApi;
//! use vitals_verify::SchemaVerifier;
//!
//! let app = PatientApi::new(service, Box::new(SchemaVerifier::new()?), config.app.about)
//!     .router();
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod middleware;
pub mod patient;
pub mod premium;

pub use error::{status_of, ApiError, ApiResult};
pub use patient::{CreatePatient, PatientApi};
pub use premium::PremiumApi;
