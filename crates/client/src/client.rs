use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use httpkit_core::headers::APPLICATION_JSON;
use httpkit_core::{CodecError, codec};

use crate::error::ClientError;

/// JSON HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct BaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl BaseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, pooling, TLS).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start building a request for `uri`, relative to the base URL.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> ClientRequest<'_> {
        ClientRequest {
            client: self,
            method,
            uri: uri.into(),
            body: None,
            params: Vec::new(),
            cookies: Vec::new(),
        }
    }

    pub fn get(&self, uri: impl Into<String>) -> ClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    pub fn post(&self, uri: impl Into<String>) -> ClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    pub fn put(&self, uri: impl Into<String>) -> ClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    pub fn delete(&self, uri: impl Into<String>) -> ClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Add cookies to an already built request, after any existing ones.
    ///
    /// A cookie list that cannot form a valid header value is skipped and
    /// logged; the request is left as it was.
    pub fn set_cookies<I, K, V>(&self, request: &mut Request, cookies: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<String> = cookies
            .into_iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect();
        if pairs.is_empty() {
            return;
        }

        let mut value = pairs.join("; ");
        if let Some(existing) = request.headers().get(COOKIE).and_then(|v| v.to_str().ok()) {
            value = format!("{existing}; {value}");
        }

        match HeaderValue::from_str(&value) {
            Ok(header) => {
                request.headers_mut().insert(COOKIE, header);
            }
            Err(e) => {
                tracing::warn!(url = %request.url(), error = %e, "skipping invalid cookies");
            }
        }
    }

    /// Execute `request`, requiring `200 OK`. The response body is discarded.
    pub async fn execute(&self, request: Request) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }

    /// Execute `request`, requiring `200 OK`, and decode the JSON body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let (url, response) = self.send(request).await?;

        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

        codec::decode(&bytes).map_err(|source| ClientError::Decode { url, source })
    }

    async fn send(&self, request: Request) -> Result<(String, Response), ClientError> {
        let url = request.url().to_string();
        tracing::debug!(method = %request.method(), url = %url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(url = %url, status = status.as_u16(), "upstream returned non-200");
            return Err(ClientError::Status { url, status });
        }

        Ok((url, response))
    }
}

/// A request under construction. Nothing is sent until
/// [`ClientRequest::send`]/[`ClientRequest::send_json`], and nothing can fail
/// until [`ClientRequest::build`].
#[derive(Debug)]
pub struct ClientRequest<'a> {
    client: &'a BaseClient,
    method: Method,
    uri: String,
    body: Option<Result<Vec<u8>, CodecError>>,
    params: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
}

impl ClientRequest<'_> {
    /// JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(codec::encode(body));
        self
    }

    /// Query parameter. Parameters with an empty value are dropped.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.cookies
            .extend(cookies.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Produce the request. Always carries `Content-Type: application/json`.
    pub fn build(self) -> Result<Request, ClientError> {
        let url = prepare_url(&self.client.base_url, &self.uri, &self.params)?;

        let mut builder = self
            .client
            .http
            .request(self.method, url.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON);

        match self.body {
            Some(Ok(bytes)) => builder = builder.body(bytes),
            Some(Err(source)) => {
                return Err(ClientError::Encode {
                    url: url.to_string(),
                    source,
                });
            }
            None => {}
        }

        let mut request = builder.build().map_err(|source| ClientError::Build {
            url: url.to_string(),
            source,
        })?;

        self.client.set_cookies(&mut request, self.cookies);
        Ok(request)
    }

    pub async fn send(self) -> Result<(), ClientError> {
        let client = self.client;
        client.execute(self.build()?).await
    }

    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let client = self.client;
        client.execute_json(self.build()?).await
    }
}

/// Join `uri` onto `base_url` and append the non-empty query parameters,
/// sorted by name.
pub(crate) fn prepare_url(
    base_url: &str,
    uri: &str,
    params: &[(String, String)],
) -> Result<Url, ClientError> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        uri.trim_start_matches('/')
    );
    let mut url = Url::parse(&raw).map_err(|source| ClientError::InvalidUrl { url: raw, source })?;

    let mut params: Vec<&(String, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    if params.is_empty() {
        return Ok(url);
    }
    params.sort_by(|a, b| a.0.cmp(&b.0));

    url.query_pairs_mut()
        .extend_pairs(params.into_iter().map(|(k, v)| (k.as_str(), v.as_str())));

    Ok(url)
}
