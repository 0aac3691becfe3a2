use reqwest::{
    Method, Response, StatusCode, Url,
    header::{HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::ClientConfig,
    error::{Error, Result},
};

pub const ACCESS_KEY_HEADER: HeaderName = HeaderName::from_static("serialized-access-key");
pub const SECRET_ACCESS_KEY_HEADER: HeaderName =
    HeaderName::from_static("serialized-secret-access-key");

/// Async client for the Serialized event-sourcing API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    access_key: HeaderValue,
    secret_access_key: HeaderValue,
}

impl Client {
    /// Creates a client with its own HTTP transport, using the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_http_client(config, http)
    }

    /// Creates a client on top of an existing HTTP transport.
    ///
    /// The configured timeout is ignored; the transport's own settings apply.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| Error::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_url(&base_url));
        }

        let mut access_key = HeaderValue::from_str(&config.access_key)?;
        access_key.set_sensitive(true);
        let mut secret_access_key = HeaderValue::from_str(&config.secret_access_key)?;
        secret_access_key.set_sensitive(true);

        Ok(Client {
            base_url,
            http,
            access_key,
            secret_access_key,
        })
    }

    /// The URL every endpoint path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an endpoint URL by appending percent-encoded path segments to the base URL.
    pub(crate) fn endpoint<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::invalid_url(&self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get(&self, url: Url) -> Result<Response> {
        self.send(Method::GET, url, None::<&()>).await
    }

    pub(crate) async fn head(&self, url: Url) -> Result<Response> {
        self.send(Method::HEAD, url, None::<&()>).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<Response> {
        self.send(Method::DELETE, url, None::<&()>).await
    }

    pub(crate) async fn post<B>(&self, url: Url, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, url, Some(body)).await
    }

    async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let path = url.path().to_string();
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCESS_KEY_HEADER, self.access_key.clone())
            .header(SECRET_ACCESS_KEY_HEADER, self.secret_access_key.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        debug!(%method, path = %path, status = %response.status(), "provider request");
        Ok(response)
    }
}

/// Passes the response through if it carries the status the endpoint returns on success.
pub(crate) async fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    warn!(%status, %expected, path = %path, "unexpected status from provider");
    Err(Error::unexpected_status(status, expected, body))
}

/// Reads the response body as JSON.
pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
