//! Document retrieval and reduction.
//!
//! - [`HttpTransport`] - reqwest-backed [`Transport`](crate::traits::transport::Transport)
//! - [`DocumentFetcher`] - ordered attempt plan (primary, then reader proxy)
//! - [`reduce`] - flatten a body into text blocks plus title/date metadata

pub mod document;
pub mod http;
pub mod reduce;

pub use document::{DocumentFetcher, Strategy};
pub use http::HttpTransport;
pub use reduce::{is_markup, reduce, MIN_BLOCK_CHARS};
