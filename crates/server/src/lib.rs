//! HTTP server side of the toolkit: handlers, middleware pipeline, router
//! composition and the server lifecycle.
//!
//! - `handler.rs`: the `Handler` callable and the `Fault` error it may return
//! - `middleware/`: the `Middleware` trait, `Pipeline`, and the stock middlewares
//! - `router.rs`: route registration, sub-router groups, the finalized `RouteTable`
//! - `codec.rs`: JSON request/response helpers on top of `httpkit-core`
//! - `server.rs` / `config.rs`: binding, serving and stopping
//! - `app.rs`: the demo service wired by `main.rs`

pub mod app;
pub mod codec;
pub mod config;
pub mod handler;
pub mod middleware;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use handler::{Fault, Handler, HandlerResult, Request};
pub use middleware::{
    Authentication, CommonJson, Cors, CorsPolicy, Middleware, PanicRecovery, Pipeline,
};
pub use router::{RouteDefinition, RouteTable, Router, RouterError};
pub use server::{Server, ServerError, ShutdownHandle};
