//! `httpkit-core`: transport-agnostic building blocks shared by the client
//! and the server crates.
//!
//! This crate contains no HTTP framework code: only header vocabulary, the
//! JSON body codec and the configuration error model.

pub mod codec;
pub mod error;
pub mod headers;

pub use codec::{decode, encode};
pub use error::{CodecError, ConfigError};
