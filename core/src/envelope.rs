//! The `{"response": {...}}` wrapper around every API body.
//!
//! `check_status` and `unwrap_data` are the two halves of response
//! classification. Both the Files client and the token provider use them.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

pub const SUCCESS_CODE: &str = "SUCCESS";

const ERROR_SEPARATOR: &str = " || ";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: EnvelopeBody,
}

#[derive(Debug, Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: String,
}

fn parse(body: &[u8]) -> Result<EnvelopeBody> {
    serde_json::from_slice::<Envelope>(body)
        .map(|envelope| envelope.response)
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

/// Turn a status >= 400 into `RemoteApi`, or `MalformedResponse` when the
/// error envelope is missing. Lower statuses pass through.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.status < 400 {
        return Ok(());
    }
    let body = parse(&response.body)?;
    let errors = body.errors.ok_or_else(|| {
        ApiError::MalformedResponse(format!(
            "status {} without response.errors",
            response.status
        ))
    })?;
    let message = errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join(ERROR_SEPARATOR);
    Err(ApiError::RemoteApi {
        status: response.status,
        message,
    })
}

/// Extract `response.data` from a success envelope. A success envelope with
/// no (or null) `data` yields `true`.
pub fn unwrap_data(body: &[u8]) -> Result<Value> {
    let body = parse(body)?;
    match body.code.as_deref() {
        Some(SUCCESS_CODE) => Ok(body.data.unwrap_or(Value::Bool(true))),
        Some(other) => Err(ApiError::MalformedResponse(format!(
            "unexpected response code {other}"
        ))),
        None => Err(ApiError::MalformedResponse("missing response.code".to_string())),
    }
}
