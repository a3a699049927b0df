use std::sync::Arc;

use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use chrono::Utc;

use httpkit_auth::{AuthConfig, TokenRejection, TokenValidator};

use crate::handler::{Handler, Request};
use crate::middleware::Middleware;

/// Bearer-token gate.
///
/// Forwards only requests whose token passes every check; everything else is
/// answered with an empty `401`. Claims are checked and then dropped: nothing
/// is attached to the request.
#[derive(Debug, Clone)]
pub struct Authentication {
    validator: Arc<TokenValidator>,
}

impl Authentication {
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_validator(Arc::new(TokenValidator::new(config)))
    }

    pub fn from_validator(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl Middleware for Authentication {
    fn wrap(&self, next: Handler) -> Handler {
        let validator = self.validator.clone();
        Handler::from_fn(move |req| {
            let next = next.clone();
            let validator = validator.clone();
            Box::pin(async move {
                match check(&validator, &req) {
                    Ok(()) => next.call(req).await,
                    Err(rejection) => {
                        tracing::debug!(
                            reason = ?rejection,
                            method = %req.method(),
                            path = %req.uri().path(),
                            "rejecting unauthenticated request"
                        );
                        Ok(StatusCode::UNAUTHORIZED.into_response())
                    }
                }
            })
        })
    }
}

fn check(validator: &TokenValidator, req: &Request) -> Result<(), TokenRejection> {
    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| TokenRejection::Malformed)?),
    };

    validator.validate(header, Utc::now()).map(|_claims| ())
}
