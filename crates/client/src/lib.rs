//! `httpkit-client`: JSON request building and execution against a base URL.
//!
//! Building and executing are separate steps: [`BaseClient::request`] returns
//! a [`ClientRequest`] that produces a plain `reqwest::Request`, which can be
//! inspected or amended (e.g. [`BaseClient::set_cookies`]) before being run by
//! [`BaseClient::execute`] or [`BaseClient::execute_json`].
//!
//! There is no retry policy here; callers own it.

pub mod client;
pub mod error;

pub use client::{BaseClient, ClientRequest};
pub use error::ClientError;
pub use reqwest::{Method, StatusCode};
