//! Middleware pipeline.
//!
//! A middleware turns a [`Handler`] into another [`Handler`]. A [`Pipeline`]
//! of `[m1, m2, m3]` applied to `h` yields `m1(m2(m3(h)))`: `m1` sees the
//! request first and the response last.
//!
//! Recommended global order: [`PanicRecovery`], then [`Cors`], then
//! [`CommonJson`]; put [`Authentication`] inside `Cors` (e.g. on a router
//! group) so pre-flight `OPTIONS` requests are answered before auth runs.

use core::fmt;
use std::sync::Arc;

use crate::handler::Handler;

mod auth;
mod content_type;
mod cors;
mod recovery;

pub use auth::Authentication;
pub use content_type::CommonJson;
pub use cors::{Cors, CorsPolicy};
pub use recovery::{GENERIC_PANIC_MESSAGE, PanicRecovery, RECOVERY_TAG};

/// `Handler -> Handler` transformation.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: Handler) -> Handler;
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn wrap(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// Ordered list of middlewares, outermost first.
#[derive(Clone, Default)]
pub struct Pipeline {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `middleware` as the new innermost layer.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.push(middleware);
        self
    }

    pub fn push(&mut self, middleware: impl Middleware) {
        self.layers.push(Arc::new(middleware));
    }

    /// Append every layer of `other`, inside the existing ones.
    pub fn extend(&mut self, other: Pipeline) {
        self.layers.extend(other.layers);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Fold the layers around `handler`, innermost first.
    pub fn apply(&self, handler: Handler) -> Handler {
        self.layers
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("layers", &self.layers.len())
            .finish()
    }
}
