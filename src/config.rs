use std::time::Duration;

use crate::{
    headers::{DefaultHeaders, HeaderSet},
    retry::RetryPolicy,
    Method, Result,
};

/// Retry delay used when a request enables retry without a delay.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 20;

/// Transport options other than headers. Unset fields inherit from the
/// layer below when configs are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Maximum number of resubmissions after the first attempt. `0` disables retry.
    pub retry: Option<u32>,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Query-string pairs appended to the URL.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn is_empty(&self) -> bool {
        self.timeout_ms.is_none()
            && self.retry.is_none()
            && self.retry_delay_ms.is_none()
            && self.query.is_empty()
    }

    /// Returns `self` with every field set in `extras` taking precedence.
    pub fn merged_with(&self, extras: &RequestOptions) -> RequestOptions {
        RequestOptions {
            timeout_ms: extras.timeout_ms.or(self.timeout_ms),
            retry: extras.retry.or(self.retry),
            retry_delay_ms: extras.retry_delay_ms.or(self.retry_delay_ms),
            query: self
                .query
                .iter()
                .chain(&extras.query)
                .cloned()
                .collect(),
        }
    }
}

/// Options for a single request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub headers: HeaderSet,
    pub options: RequestOptions,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers.overlay(&headers);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.options.retry = Some(retry);
        self
    }

    pub fn retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.options.retry_delay_ms = Some(retry_delay_ms);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.options.is_empty()
    }

    /// Retry policy for this config, or `None` when retry is disabled.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        let max_retries = self.options.retry.filter(|retry| *retry > 0)?;
        let delay_ms = self.options.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS);
        Some(RetryPolicy::new(max_retries, Duration::from_millis(delay_ms)))
    }
}

impl From<()> for RequestConfig {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<HeaderSet> for RequestConfig {
    fn from(headers: HeaderSet) -> Self {
        Self {
            headers,
            options: RequestOptions::default(),
        }
    }
}

/// Client-wide defaults that every request config is merged over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultConfig {
    pub headers: DefaultHeaders,
    pub options: RequestOptions,
}

impl DefaultConfig {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.options.is_empty()
    }

    /// Merges `extras` over these defaults for a request using `method`.
    pub fn resolve(&self, method: Method, extras: &RequestConfig) -> RequestConfig {
        if self.is_empty() && extras.is_empty() {
            return RequestConfig::default();
        }
        RequestConfig {
            headers: self.headers.resolve(method, &extras.headers),
            options: self.options.merged_with(&extras.options),
        }
    }
}

/// Merges `extras` over `defaults` for `method`.
///
/// Two empty inputs short-circuit to an empty config without looking at
/// `method`; otherwise an unsupported method is an error.
pub fn resolve_config(
    method: &str,
    defaults: &DefaultConfig,
    extras: &RequestConfig,
) -> Result<RequestConfig> {
    if defaults.is_empty() && extras.is_empty() {
        return Ok(RequestConfig::default());
    }
    let method: Method = method.parse()?;
    Ok(defaults.resolve(method, extras))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{resolve_config, DefaultConfig, RequestConfig, RequestOptions};
    use crate::{DefaultHeaders, HttpError, Method};

    fn defaults() -> DefaultConfig {
        DefaultConfig {
            headers: DefaultHeaders::new()
                .header("Content-Type", "application/json;charset=UTF-8")
                .for_method(Method::Put, "X-Put", "1"),
            options: RequestOptions {
                timeout_ms: Some(10_000),
                retry: Some(1),
                retry_delay_ms: None,
                query: vec![("v".to_owned(), "1".to_owned())],
            },
        }
    }

    #[test]
    fn empty_inputs_resolve_to_empty_config() {
        let config = resolve_config("get", &DefaultConfig::default(), &RequestConfig::new())
            .expect("empty config must resolve");
        assert!(config.is_empty());
    }

    #[test]
    fn empty_inputs_skip_method_validation() {
        let config = resolve_config("trace", &DefaultConfig::default(), &RequestConfig::new())
            .expect("short-circuit must not validate the method");
        assert_eq!(config, RequestConfig::default());
    }

    #[test]
    fn non_empty_inputs_validate_method() {
        let err = resolve_config("trace", &defaults(), &RequestConfig::new())
            .expect_err("trace must be rejected");
        assert!(matches!(err, HttpError::InvalidMethod(_)));
    }

    #[test]
    fn extras_override_defaults() {
        let extras = RequestConfig::new()
            .header("content-type", "application/x-www-form-urlencoded")
            .timeout_ms(500)
            .retry_delay_ms(5)
            .query("page", "2");
        let config = resolve_config("PUT", &defaults(), &extras).unwrap();

        assert_eq!(
            config.headers.get("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(config.headers.get("X-Put"), Some("1"));
        assert_eq!(config.options.timeout_ms, Some(500));
        assert_eq!(config.options.retry, Some(1));
        assert_eq!(config.options.retry_delay_ms, Some(5));
        assert_eq!(
            config.options.query,
            vec![
                ("v".to_owned(), "1".to_owned()),
                ("page".to_owned(), "2".to_owned())
            ]
        );
    }

    #[test]
    fn retry_policy_requires_positive_retry() {
        assert!(RequestConfig::new().retry_policy().is_none());
        assert!(RequestConfig::new().retry(0).retry_policy().is_none());

        let policy = RequestConfig::new().retry(3).retry_policy().unwrap();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.delay(), Duration::from_millis(20));

        let policy = RequestConfig::new()
            .retry(2)
            .retry_delay_ms(10)
            .retry_policy()
            .unwrap();
        assert_eq!(policy.delay(), Duration::from_millis(10));
    }
}
