use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{HttpError, Method, Result};

const COMMON_SECTION: &str = "common";

/// Ordered header map with ASCII case-insensitive names.
///
/// Inserting a name that is already present replaces the value but keeps the
/// spelling and position of the first insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a header, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name)
            .map(|index| self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Copies every header of `other` over this set, last write wins.
    pub fn overlay(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Converts into a transport header map.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in self.iter() {
            let invalid = || HttpError::InvalidHeader {
                name: name.to_owned(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    pub(crate) fn from_header_map(map: &HeaderMap) -> Self {
        map.iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    fn strip_reserved(&mut self) {
        self.entries.retain(|(name, _)| !is_reserved_name(name));
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Client-wide default headers, split by the layer they apply to.
///
/// Resolution order is `base`, then `common`, then the section for the
/// request method, then the per-call headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultHeaders {
    pub base: HeaderSet,
    pub common: HeaderSet,
    pub per_method: HashMap<Method, HeaderSet>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to the base layer.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.insert(name, value);
        self
    }

    /// Adds a header to the layer shared by all methods.
    pub fn common(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.common.insert(name, value);
        self
    }

    /// Adds a header that only applies to `method`.
    pub fn for_method(
        mut self,
        method: Method,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.per_method
            .entry(method)
            .or_default()
            .insert(name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
            && self.common.is_empty()
            && self.per_method.values().all(HeaderSet::is_empty)
    }

    /// Overlays `other` onto these defaults layer by layer.
    pub fn overlay(&mut self, other: &DefaultHeaders) {
        self.base.overlay(&other.base);
        self.common.overlay(&other.common);
        for (method, headers) in &other.per_method {
            self.per_method.entry(*method).or_default().overlay(headers);
        }
    }

    /// Produces the headers sent for one request.
    pub fn resolve(&self, method: Method, extras: &HeaderSet) -> HeaderSet {
        let mut resolved = self.base.clone();
        resolved.overlay(&self.common);
        if let Some(section) = self.per_method.get(&method) {
            resolved.overlay(section);
        }
        resolved.overlay(extras);
        resolved.strip_reserved();
        resolved
    }
}

/// Resolves the headers for `method`, validating the method name first.
pub fn resolve_headers(
    method: &str,
    defaults: &DefaultHeaders,
    extras: &HeaderSet,
) -> Result<HeaderSet> {
    let method: Method = method.parse()?;
    Ok(defaults.resolve(method, extras))
}

fn is_reserved_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(COMMON_SECTION)
        || Method::ALL
            .iter()
            .any(|method| method.as_str().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{resolve_headers, DefaultHeaders, HeaderSet};
    use crate::{HttpError, Method};

    fn layered() -> DefaultHeaders {
        DefaultHeaders::new()
            .header("Content-Type", "application/json;charset=UTF-8")
            .header("X-Layer", "base")
            .header("X-Base", "1")
            .common("X-Layer", "common")
            .common("X-Common", "1")
            .for_method(Method::Post, "X-Layer", "post")
            .for_method(Method::Post, "X-Post", "1")
            .for_method(Method::Get, "X-Get", "1")
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let extras = HeaderSet::from([("X-Extra", "1")]);
        let headers = resolve_headers("post", &layered(), &extras).unwrap();

        assert_eq!(headers.get("X-Layer"), Some("post"));
        assert_eq!(headers.get("X-Base"), Some("1"));
        assert_eq!(headers.get("X-Common"), Some("1"));
        assert_eq!(headers.get("X-Post"), Some("1"));
        assert_eq!(headers.get("X-Extra"), Some("1"));
        assert!(!headers.contains("X-Get"));

        let extras = HeaderSet::from([("x-layer", "extra")]);
        let headers = resolve_headers("POST", &layered(), &extras).unwrap();
        assert_eq!(headers.get("X-Layer"), Some("extra"));
    }

    #[test]
    fn common_applies_when_method_has_no_section() {
        let headers = resolve_headers("delete", &layered(), &HeaderSet::new()).unwrap();
        assert_eq!(headers.get("X-Layer"), Some("common"));
        assert!(!headers.contains("X-Post"));
        assert!(!headers.contains("X-Get"));
    }

    #[test]
    fn reserved_names_never_reach_the_result() {
        let defaults = layered().header("common", "x").header("GET", "y");
        let extras = HeaderSet::from([("head", "z"), ("X-Extra", "1")]);
        let headers = resolve_headers("get", &defaults, &extras).unwrap();

        for (name, _) in headers.iter() {
            assert!(!name.eq_ignore_ascii_case("common"), "found {name}");
            assert!(name.parse::<Method>().is_err(), "found {name}");
        }
        assert_eq!(headers.get("X-Extra"), Some("1"));
    }

    #[test]
    fn invalid_method_is_rejected() {
        let err = resolve_headers("trace", &DefaultHeaders::new(), &HeaderSet::new())
            .expect_err("trace is not supported");
        assert!(matches!(err, HttpError::InvalidMethod(method) if method == "trace"));
    }

    #[test]
    fn resolving_does_not_mutate_defaults() {
        let defaults = layered();
        let before = defaults.clone();
        let _ = defaults.resolve(Method::Post, &HeaderSet::from([("X-Extra", "1")]));
        assert_eq!(defaults, before);
    }

    #[test]
    fn insert_is_case_insensitive_and_keeps_first_spelling() {
        let mut headers = HeaderSet::new().with("Content-Type", "application/json");
        let previous = headers.insert("content-type", "text/plain");

        assert_eq!(previous.as_deref(), Some("application/json"));
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("Content-Type", "text/plain")]
        );
    }

    #[test]
    fn header_map_conversion_rejects_invalid_names() {
        let headers = HeaderSet::from([("bad header", "v")]);
        match headers.to_header_map() {
            Err(HttpError::InvalidHeader { name }) => assert_eq!(name, "bad header"),
            other => panic!("expected invalid header, got {other:?}"),
        }
    }
}
