use std::fmt;
use std::str::FromStr;

use crate::HttpError;

/// HTTP verbs accepted by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl Method {
    /// Every supported method, in declaration order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
        Method::Head,
    ];

    /// Lowercase name, as used for per-method header sections.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Options => "options",
            Method::Head => "head",
        }
    }

    /// Whether requests with this method carry a body.
    pub fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| HttpError::InvalidMethod(value.to_owned()))
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Method;
    use crate::HttpError;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!("options".parse::<Method>().unwrap(), Method::Options);
    }

    #[test]
    fn rejects_unknown_verbs() {
        for value in ["trace", "connect", "", "get "] {
            match value.parse::<Method>() {
                Err(HttpError::InvalidMethod(method)) => assert_eq!(method, value),
                other => panic!("expected invalid method for {value:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn converts_to_transport_method() {
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(reqwest::Method::from(Method::Head), reqwest::Method::HEAD);
    }
}
