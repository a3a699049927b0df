use core::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use thiserror::Error;

pub use axum::extract::Request;

/// Outcome of invoking a handler.
pub type HandlerResult = Result<Response, Fault>;

/// Explicit failure raised by a handler or middleware.
///
/// Only the recovery middleware turns a `Fault` into a response. Dropping the
/// request future (client gone, timeout upstream) is cancellation, not a fault.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Fault(#[from] anyhow::Error);

impl Fault {
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(anyhow::Error::msg(message))
    }

    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(error))
    }
}

type HandlerFn = dyn Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// Request handling unit. Cheap to clone; immutable once built.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Handler that cannot fail.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::from_fn(move |req| {
            let fut = f(req);
            Box::pin(async move { Ok(fut.await.into_response()) })
        })
    }

    /// Handler that reports failures as [`Fault`].
    pub fn fallible<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Fault>> + Send + 'static,
        R: IntoResponse,
    {
        Self::from_fn(move |req| {
            let fut = f(req);
            Box::pin(async move { fut.await.map(IntoResponse::into_response) })
        })
    }

    /// Lowest-level constructor; middlewares build their wrappers with it.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn call(&self, req: Request) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn infallible_handler_converts_into_response() {
        let handler = Handler::new(|_req| async { (StatusCode::CREATED, "made") });

        let response = handler.call(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn fallible_handler_surfaces_fault() {
        let handler = Handler::fallible(|_req| async {
            Err::<StatusCode, _>(Fault::msg("database is gone"))
        });

        let fault = handler.call(request()).await.unwrap_err();
        assert_eq!(fault.to_string(), "database is gone");
    }

    #[tokio::test]
    async fn fault_wraps_std_errors() {
        let handler = Handler::fallible(|_req| async {
            let n: i32 = "x".parse().map_err(Fault::new)?;
            Ok(n.to_string())
        });

        assert!(handler.call(request()).await.is_err());
    }
}
