//! Demo service: a public and an authenticated health check.

use axum::Json;
use serde_json::json;

use httpkit_auth::AuthConfig;

use crate::config::ServerConfig;
use crate::handler::Handler;
use crate::middleware::{Authentication, CommonJson, Cors, PanicRecovery, Pipeline};
use crate::router::{RouteDefinition, RouteTable, Router};

pub fn health() -> Handler {
    Handler::new(|_req| async { Json(json!({ "status": "ok" })) })
}

/// `GET /health` is public; `GET /v1/health` requires a bearer token.
pub fn build_app(server: &ServerConfig, auth: &AuthConfig) -> anyhow::Result<RouteTable> {
    let mut router = Router::new();

    router.get("/health", health())?;
    router.group(
        "/v1",
        [RouteDefinition::get("/health", health())],
        Pipeline::new().layer(Authentication::new(auth)),
    )?;

    router.set_middlewares(
        Pipeline::new()
            .layer(PanicRecovery::new())
            .layer(Cors::new(server.cors_policy()?))
            .layer(CommonJson),
    );

    Ok(router.build())
}

#[cfg(test)]
mod tests {
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{HeaderValue, Method, StatusCode};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::Value;

    use super::*;
    use crate::middleware::test_support::{body_bytes, request};

    const SECRET: &str = "app-secret";

    fn app() -> RouteTable {
        build_app(&ServerConfig::default(), &AuthConfig::new(SECRET).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn public_health_needs_no_token() {
        let response = app().dispatch(request(Method::GET, "/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn protected_health_rejects_missing_token_with_json_headers() {
        let response = app().dispatch(request(Method::GET, "/v1/health")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn protected_health_accepts_valid_token() {
        let token = jsonwebtoken::encode(
            &Header::default(),
            &json!({ "exp": (Utc::now() + Duration::minutes(10)).timestamp() }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let mut req = request(Method::GET, "/v1/health");
        req.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let response = app().dispatch(req).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn preflight_to_protected_route_skips_auth() {
        let response = app().dispatch(request(Method::OPTIONS, "/v1/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn unknown_route_is_404_with_cors_headers() {
        let response = app().dispatch(request(Method::GET, "/missing")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
