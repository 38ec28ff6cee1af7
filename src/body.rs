use serde::Serialize;

use crate::{HeaderSet, HttpError, Result};

pub(crate) const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Serializes `data` according to the resolved `Content-Type` header.
///
/// Form content types get `serde_urlencoded`, everything else JSON text.
pub(crate) fn encode_body<B>(headers: &HeaderSet, data: &B) -> Result<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    if is_form_urlencoded(headers) {
        serde_urlencoded::to_string(data)
            .map(String::into_bytes)
            .map_err(|err| HttpError::Encode(format!("invalid form body: {err}")))
    } else {
        serde_json::to_vec(data).map_err(|err| HttpError::Encode(format!("invalid JSON body: {err}")))
    }
}

fn is_form_urlencoded(headers: &HeaderSet) -> bool {
    headers
        .get("content-type")
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}
