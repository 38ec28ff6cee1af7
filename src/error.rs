/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The method string is not one of the supported HTTP verbs.
    #[error("invalid request method: {0}")]
    InvalidMethod(String),
    /// A header name or value cannot be sent on the wire.
    #[error("invalid header: {name}")]
    InvalidHeader { name: String },
    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body does not match the requested shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl HttpError {
    /// Returns `true` for failures that a retry policy may resubmit.
    ///
    /// Only failures that happened on the wire qualify; configuration and
    /// encoding errors, including requests `reqwest` refuses to build, would
    /// fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => is_wire_failure(err),
            Self::Http { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for failures raised by the client itself rather than
    /// by the network or the server.
    pub fn is_local(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_builder(),
            Self::Http { .. } => false,
            _ => true,
        }
    }
}

fn is_wire_failure(err: &reqwest::Error) -> bool {
    !err.is_builder()
        && (err.is_timeout() || err.is_request() || err.is_body() || err.is_connect())
}
