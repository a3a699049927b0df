use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use serde_json::json;

use crate::codec;
use crate::handler::{Fault, Handler};
use crate::middleware::Middleware;

/// Tag attached to every recovery log line.
pub const RECOVERY_TAG: &str = "[PANIC RECOVERY]";

/// Message returned to clients; never the actual panic text.
pub const GENERIC_PANIC_MESSAGE: &str = "something went wrong";

/// Converts panics and [`Fault`](crate::Fault)s from the wrapped chain into a
/// `500 {"panic": "something went wrong"}` response.
///
/// Must be the outermost layer of anything that can fail.
#[derive(Debug, Clone)]
pub struct PanicRecovery {
    tag: Arc<str>,
}

impl PanicRecovery {
    pub fn new() -> Self {
        Self {
            tag: Arc::from(RECOVERY_TAG),
        }
    }

    pub fn with_tag(tag: impl Into<Arc<str>>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for PanicRecovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for PanicRecovery {
    fn wrap(&self, next: Handler) -> Handler {
        let tag = self.tag.clone();
        Handler::from_fn(move |req| {
            let next = next.clone();
            let tag = tag.clone();
            Box::pin(async move {
                // `call` itself runs inside the guarded future.
                let outcome = AssertUnwindSafe(async move { next.call(req).await })
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(Ok(response)) => return Ok(response),
                    Ok(Err(fault)) => {
                        let error = format!("{fault:#}");
                        tracing::error!(tag = %tag, error = %error, "handler fault");
                    }
                    Err(payload) => {
                        tracing::error!(
                            tag = %tag,
                            "panic occurred: {}",
                            panic_message(&*payload)
                        );
                    }
                }

                Ok::<_, Fault>(panic_response())
            })
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

fn panic_response() -> Response {
    codec::write_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "panic": GENERIC_PANIC_MESSAGE }),
    )
    .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
