use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{HeaderSet, HttpError, Result};

/// Status reported by [`normalize`] when no response was received.
pub const NETWORK_FAILURE_STATUS: i32 = -404;
/// Status reported by [`normalize`] when the request never left the client.
pub const LOCAL_FAILURE_STATUS: i32 = -1;

const STATUS_TEXT_HTTP_ERROR: &str = "请求错误";
const STATUS_TEXT_NETWORK_FAILURE: &str = "网络连接失败";
const STATUS_TEXT_LOCAL_FAILURE: &str = "请求配置错误";

/// Successful response with the body read as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderSet,
    pub data: String,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderSet, data: String) -> Self {
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            data,
        }
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).map_err(|err| {
            HttpError::Decode(format!("invalid JSON response: {err}; body: {}", self.data))
        })
    }
}

/// Response-shaped view of any request outcome. Never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedResponse {
    pub data: String,
    pub status: i32,
    pub status_text: String,
}

impl NormalizedResponse {
    fn failure(data: String, status: i32, status_text: &str) -> Self {
        Self {
            data,
            status,
            status_text: status_text.to_owned(),
        }
    }
}

impl From<Response> for NormalizedResponse {
    fn from(response: Response) -> Self {
        Self {
            data: response.data,
            status: i32::from(response.status),
            status_text: response.status_text,
        }
    }
}

/// Folds a finished request into a [`NormalizedResponse`].
///
/// HTTP errors keep their status and body, transport failures become
/// [`NETWORK_FAILURE_STATUS`] and local failures [`LOCAL_FAILURE_STATUS`].
pub fn normalize(result: Result<Response>) -> NormalizedResponse {
    match result {
        Ok(response) => response.into(),
        Err(HttpError::Http { status, body }) => {
            let status_text = match StatusCode::from_u16(status) {
                Ok(code) if code.is_client_error() || code.is_server_error() => {
                    STATUS_TEXT_HTTP_ERROR
                }
                Ok(code) => code.canonical_reason().unwrap_or_default(),
                Err(_) => STATUS_TEXT_HTTP_ERROR,
            };
            NormalizedResponse::failure(body, i32::from(status), status_text)
        }
        Err(err) if err.is_local() => NormalizedResponse::failure(
            String::new(),
            LOCAL_FAILURE_STATUS,
            STATUS_TEXT_LOCAL_FAILURE,
        ),
        Err(_) => NormalizedResponse::failure(
            String::new(),
            NETWORK_FAILURE_STATUS,
            STATUS_TEXT_NETWORK_FAILURE,
        ),
    }
}
