use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use httpkit_core::CodecError;
use httpkit_core::headers::APPLICATION_JSON;

use crate::handler::Request;

/// Upper bound on request bodies read by [`read_json`].
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Read the whole request body and decode it as JSON.
///
/// The `Content-Type` header is not checked.
pub async fn read_json<T>(req: Request) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| CodecError::body(e.to_string()))?;
    httpkit_core::decode(&bytes)
}

/// Serialize `value` into a response with the given status and a JSON
/// content type.
pub fn write_json<T>(status: StatusCode, value: &T) -> Result<Response, CodecError>
where
    T: Serialize + ?Sized,
{
    let body = httpkit_core::encode(value)?;
    Ok((
        status,
        [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
        body,
    )
        .into_response())
}
