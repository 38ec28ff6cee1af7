use crate::DefaultHeaders;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configures base URL, timeout, default headers and retry defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    /// Prefix for relative request URLs.
    pub base_url: Option<String>,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Default headers, layered under every request's own headers.
    pub headers: DefaultHeaders,
    /// Default maximum resubmissions. `None` or `0` disables retry.
    pub retry: Option<u32>,
    /// Default delay between attempts in milliseconds.
    pub retry_delay_ms: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: DefaultHeaders::default(),
            retry: None,
            retry_delay_ms: None,
        }
    }
}

impl ClientOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_headers(mut self, headers: DefaultHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(retry_delay_ms);
        self
    }

    /// Reads options from environment variables.
    ///
    /// All variables are optional:
    /// - `LAYERED_HTTP_BASE_URL`
    /// - `LAYERED_HTTP_TIMEOUT_MS`
    /// - `LAYERED_HTTP_RETRY`
    /// - `LAYERED_HTTP_RETRY_DELAY_MS`
    ///
    /// Returns an error if a numeric variable is set but not a number.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(base_url) = lookup("LAYERED_HTTP_BASE_URL").filter(|v| !v.trim().is_empty()) {
            options.base_url = Some(base_url.trim().to_owned());
        }
        if let Some(timeout_ms) = parse_var(&lookup, "LAYERED_HTTP_TIMEOUT_MS")? {
            options.timeout_ms = timeout_ms;
        }
        options.retry = parse_var(&lookup, "LAYERED_HTTP_RETRY")?;
        options.retry_delay_ms = parse_var(&lookup, "LAYERED_HTTP_RETRY_DELAY_MS")?;
        Ok(options)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> std::result::Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::ClientOptions;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_use_ten_second_timeout_and_no_retry() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout_ms, 10_000);
        assert_eq!(options.retry, None);
        assert_eq!(options.base_url, None);
    }

    #[test]
    fn reads_all_variables() {
        let options = ClientOptions::from_lookup(lookup(&[
            ("LAYERED_HTTP_BASE_URL", " https://api.example.com "),
            ("LAYERED_HTTP_TIMEOUT_MS", "2500"),
            ("LAYERED_HTTP_RETRY", "3"),
            ("LAYERED_HTTP_RETRY_DELAY_MS", "50"),
        ]))
        .unwrap();

        assert_eq!(options.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(options.timeout_ms, 2500);
        assert_eq!(options.retry, Some(3));
        assert_eq!(options.retry_delay_ms, Some(50));
    }

    #[test]
    fn missing_variables_keep_defaults() {
        let options = ClientOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, ClientOptions::default());
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = ClientOptions::from_lookup(lookup(&[("LAYERED_HTTP_RETRY", "many")]))
            .expect_err("retry must be numeric");
        assert!(err.contains("LAYERED_HTTP_RETRY"));
    }
}
