use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Serialize;
use tokio::time::sleep;

use crate::{
    body::encode_body,
    normalize,
    retry::{check_retry, Attempt, RetryDecision},
    ClientOptions, DefaultConfig, DefaultHeaders, HeaderSet, HttpError, Method,
    NormalizedResponse, ProgressObserver, RequestConfig, RequestOptions, Response, Result,
};

const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Builds a client from `options`.
pub fn create_client(options: ClientOptions) -> HttpClient {
    HttpClient::new(options)
}

#[derive(Clone)]
/// HTTP client that layers default headers under each request and
/// resubmits failed requests according to their retry policy.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Option<String>,
    defaults: DefaultConfig,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base_headers: Vec<(&str, &str)> = self
            .defaults
            .headers
            .base
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name, "<redacted>")
                } else {
                    (name, value)
                }
            })
            .collect();
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("base_headers", &base_headers)
            .field("options", &self.defaults.options)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl HttpClient {
    /// Creates a client. The base header layer starts with
    /// `Content-Type: application/json;charset=UTF-8`, which
    /// `options.headers` may override.
    pub fn new(options: ClientOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: None,
            defaults: DefaultConfig::default(),
            progress: None,
        }
        .with_options(options)
    }

    /// Creates a client from environment variables.
    ///
    /// See [`ClientOptions::from_env`] for the variables read.
    pub fn from_env() -> std::result::Result<Self, String> {
        ClientOptions::from_env().map(Self::new)
    }

    /// Replaces base URL, default headers, timeout and retry defaults.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        let mut headers = DefaultHeaders::new().header("Content-Type", DEFAULT_CONTENT_TYPE);
        headers.overlay(&options.headers);

        self.base_url = options.base_url;
        self.defaults = DefaultConfig {
            headers,
            options: RequestOptions {
                timeout_ms: Some(options.timeout_ms),
                retry: options.retry,
                retry_delay_ms: options.retry_delay_ms,
                query: Vec::new(),
            },
        };
        self
    }

    /// Uses a preconfigured transport client (proxies, TLS roots, pools).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Installs hooks notified when calls start and settle.
    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn defaults(&self) -> &DefaultConfig {
        &self.defaults
    }

    pub async fn get<C: Into<RequestConfig>>(&self, url: &str, config: C) -> Result<Response> {
        self.prepare(Method::Get, url, config.into())?.send().await
    }

    pub async fn delete<C: Into<RequestConfig>>(&self, url: &str, config: C) -> Result<Response> {
        self.prepare(Method::Delete, url, config.into())?
            .send()
            .await
    }

    pub async fn head<C: Into<RequestConfig>>(&self, url: &str, config: C) -> Result<Response> {
        self.prepare(Method::Head, url, config.into())?.send().await
    }

    pub async fn options<C: Into<RequestConfig>>(&self, url: &str, config: C) -> Result<Response> {
        self.prepare(Method::Options, url, config.into())?
            .send()
            .await
    }

    /// Sends `data` as the body, form-encoded or JSON depending on the
    /// resolved `Content-Type`.
    pub async fn post<B, C>(&self, url: &str, data: &B, config: C) -> Result<Response>
    where
        B: Serialize + ?Sized,
        C: Into<RequestConfig>,
    {
        self.prepare(Method::Post, url, config.into())?
            .body(data)?
            .send()
            .await
    }

    pub async fn put<B, C>(&self, url: &str, data: &B, config: C) -> Result<Response>
    where
        B: Serialize + ?Sized,
        C: Into<RequestConfig>,
    {
        self.prepare(Method::Put, url, config.into())?
            .body(data)?
            .send()
            .await
    }

    pub async fn patch<B, C>(&self, url: &str, data: &B, config: C) -> Result<Response>
    where
        B: Serialize + ?Sized,
        C: Into<RequestConfig>,
    {
        self.prepare(Method::Patch, url, config.into())?
            .body(data)?
            .send()
            .await
    }

    /// Prepares a request for a method given by name.
    ///
    /// Unsupported methods fail here, before anything is sent.
    pub fn request<C: Into<RequestConfig>>(
        &self,
        method: &str,
        url: &str,
        config: C,
    ) -> Result<PreparedRequest<'_>> {
        let method: Method = method.parse()?;
        self.prepare(method, url, config.into())
    }

    fn prepare(
        &self,
        method: Method,
        url: &str,
        extras: RequestConfig,
    ) -> Result<PreparedRequest<'_>> {
        let config = self.defaults.resolve(method, &extras);
        let headers = config.headers.to_header_map()?;
        Ok(PreparedRequest {
            client: self,
            method,
            url: self.build_url(url),
            headers,
            config,
            body: None,
        })
    }

    fn build_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute_url(url) => {
                let base = base.trim_end_matches('/');
                let path = url.trim_start_matches('/');
                if path.is_empty() {
                    base.to_owned()
                } else {
                    format!("{base}/{path}")
                }
            }
            _ => url.to_owned(),
        }
    }
}

/// A resolved request, ready to be sent.
pub struct PreparedRequest<'a> {
    client: &'a HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    config: RequestConfig,
    body: Option<Vec<u8>>,
}

impl fmt::Debug for PreparedRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("options", &self.config.options)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

impl PreparedRequest<'_> {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The config after merging over the client defaults.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Encodes `data` using the resolved `Content-Type`. Ignored by methods
    /// that never carry a body.
    pub fn body<B: Serialize + ?Sized>(mut self, data: &B) -> Result<Self> {
        if self.method.has_body() {
            self.body = Some(encode_body(&self.config.headers, data)?);
        }
        Ok(self)
    }

    /// Sends the request, resubmitting failures while the retry policy allows.
    pub async fn send(self) -> Result<Response> {
        if let Some(observer) = &self.client.progress {
            observer.on_start(self.method, &self.url);
        }

        let result = self.send_with_retry().await;

        if let Some(observer) = &self.client.progress {
            let status = match &result {
                Ok(response) => Some(response.status),
                Err(HttpError::Http { status, .. }) => Some(*status),
                Err(_) => None,
            };
            observer.on_finish(self.method, &self.url, status);
        }
        result
    }

    /// Sends the request and folds any failure into a response-shaped value.
    pub async fn send_normalized(self) -> NormalizedResponse {
        normalize(self.send().await)
    }

    async fn send_with_retry(&self) -> Result<Response> {
        let policy = self.config.retry_policy();
        let mut attempt = Attempt::first();
        loop {
            let err = match self.send_once().await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => err,
                Err(err) => return Err(err),
            };

            match check_retry(policy.as_ref(), attempt) {
                RetryDecision::Resubmit { next, delay } => {
                    self.wait_before_retry(next, delay, &err).await;
                    attempt = next;
                }
                RetryDecision::Propagate => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        method = %self.method,
                        url = %self.url,
                        retries = attempt.retry_count(),
                        "request failed: {}",
                        err
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn send_once(&self) -> Result<Response> {
        let mut request = self
            .client
            .http
            .request(self.method.into(), &self.url)
            .headers(self.headers.clone());
        if let Some(timeout_ms) = self.config.options.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }
        if !self.config.options.query.is_empty() {
            request = request.query(&self.config.options.query);
        }
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(method = %self.method, url = %self.url, "dispatching request");

        let response = request.send().await.map_err(HttpError::Transport)?;
        let status = response.status();
        let headers = HeaderSet::from_header_map(response.headers());
        let data = response.text().await.map_err(HttpError::Transport)?;

        if !status.is_success() {
            return Err(HttpError::Http {
                status: status.as_u16(),
                body: data,
            });
        }
        Ok(Response::new(status, headers, data))
    }

    /// Sleeps for the policy's fixed delay before dispatch `next`.
    async fn wait_before_retry(&self, next: Attempt, delay: Duration, err: &HttpError) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %self.method,
            url = %self.url,
            retry = next.retry_count(),
            "retrying after {} ms: {}",
            delay.as_millis(),
            err
        );

        #[cfg(not(feature = "tracing"))]
        let _ = (next, err);

        sleep(delay).await;
    }
}

fn is_absolute_url(url: &str) -> bool {
    let prefix = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}
