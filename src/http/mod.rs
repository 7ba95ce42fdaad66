//! HTTP client module
//!
//! Request plumbing shared by every service client.
//!
//! # Features
//!
//! - **Shared transport**: one pooled `reqwest::Client` per service client
//! - **Body kinds**: JSON documents, raw bytes, and streamed readers
//! - **Integrity**: optional `Content-MD5` for binary uploads
//! - **Authentication**: key-pair signing or scoped tokens via the auth module
//!
//! There is no retry or backoff: a failed call surfaces immediately.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{md5_base64, Body, BodyReader, RequestBuilder};

#[cfg(test)]
mod tests;
