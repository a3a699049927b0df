use std::sync::Arc;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;

use httpkit_core::ConfigError;
use httpkit_core::headers::{DEFAULT_ALLOWED_HEADERS, DEFAULT_ALLOWED_METHODS, DEFAULT_ALLOWED_ORIGIN};

use crate::handler::{Fault, Handler};
use crate::middleware::Middleware;

/// Fixed CORS header values. The origin is not reflected per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
            allow_methods: HeaderValue::from_static(DEFAULT_ALLOWED_METHODS),
            allow_headers: HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS),
        }
    }
}

impl CorsPolicy {
    pub fn with_origin(self, origin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            allow_origin: header_value("allow_origin", origin)?,
            ..self
        })
    }

    pub fn with_methods(self, methods: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            allow_methods: header_value("allow_methods", methods)?,
            ..self
        })
    }

    pub fn with_headers(self, headers: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            allow_headers: header_value("allow_headers", headers)?,
            ..self
        })
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

fn header_value(key: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing(key));
    }
    HeaderValue::from_str(value).map_err(|e| ConfigError::invalid(key, e.to_string()))
}

/// Adds the CORS headers to every response and answers pre-flight `OPTIONS`
/// requests itself with an empty `200`.
#[derive(Debug, Clone, Default)]
pub struct Cors {
    policy: Arc<CorsPolicy>,
}

impl Cors {
    pub fn new(policy: CorsPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Middleware for Cors {
    fn wrap(&self, next: Handler) -> Handler {
        let policy = self.policy.clone();
        Handler::from_fn(move |req| {
            let next = next.clone();
            let policy = policy.clone();
            Box::pin(async move {
                let mut response = if req.method() == Method::OPTIONS {
                    StatusCode::OK.into_response()
                } else {
                    next.call(req).await?
                };

                policy.apply(response.headers_mut());
                Ok::<_, Fault>(response)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::middleware::test_support::{body_bytes, counting_handler, request};

    #[tokio::test]
    async fn preflight_is_answered_without_calling_handler() {
        let (handler, calls) = counting_handler();

        let response = Cors::default()
            .wrap(handler)
            .call(request(Method::OPTIONS, "/v1/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_HEADERS], DEFAULT_ALLOWED_HEADERS);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn other_methods_reach_handler_and_get_headers() {
        let (handler, calls) = counting_handler();

        let response = Cors::default()
            .wrap(handler)
            .call(request(Method::POST, "/items"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_bytes(response).await, b"ok");
    }

    #[tokio::test]
    async fn configured_origin_is_used() {
        let (handler, _) = counting_handler();
        let policy = CorsPolicy::default()
            .with_origin("https://app.example.com")
            .unwrap();

        let response = Cors::new(policy)
            .wrap(handler)
            .call(request(Method::GET, "/"))
            .await
            .unwrap();

        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
    }

    #[tokio::test]
    async fn handler_headers_are_overridden_not_duplicated() {
        let handler = Handler::new(|_req| async {
            ([(ACCESS_CONTROL_ALLOW_ORIGIN, "https://evil.example")], "body")
        });

        let response = Cors::default()
            .wrap(handler)
            .call(request(Method::GET, "/"))
            .await
            .unwrap();

        let origins: Vec<_> = response
            .headers()
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .collect();
        assert_eq!(origins, vec!["*"]);
    }

    #[test]
    fn invalid_policy_values_are_config_errors() {
        assert_eq!(
            CorsPolicy::default().with_origin("").unwrap_err(),
            ConfigError::Missing("allow_origin")
        );
        assert!(matches!(
            CorsPolicy::default().with_headers("bad\nvalue"),
            Err(ConfigError::Invalid { key: "allow_headers", .. })
        ));
    }
}
