use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;

use httpkit_core::headers::APPLICATION_JSON;

use crate::handler::{Fault, Handler};
use crate::middleware::Middleware;

/// Forces `Content-Type: application/json` on every response, including
/// short-circuit responses produced by inner middlewares.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonJson;

impl Middleware for CommonJson {
    fn wrap(&self, next: Handler) -> Handler {
        Handler::from_fn(move |req| {
            let next = next.clone();
            Box::pin(async move {
                let mut response = next.call(req).await?;
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
                Ok::<_, Fault>(response)
            })
        })
    }
}
