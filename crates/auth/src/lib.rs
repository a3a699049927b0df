//! `httpkit-auth`: bearer-token validation (transport-agnostic).
//!
//! This crate knows nothing about HTTP frameworks: it takes the raw value of
//! the `Authorization` header and a clock reading, and answers with either
//! typed [`Claims`] or a [`TokenRejection`].

pub mod claims;
pub mod config;
pub mod token;

pub use claims::{Claims, RawClaims};
pub use config::{AuthConfig, JWT_SECRET_ENV};
pub use token::{TokenRejection, TokenValidator};
