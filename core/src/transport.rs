//! Default `HttpExecutor` backed by a blocking `reqwest` client.
//!
//! 4xx/5xx responses come back as data for the client to classify; only
//! exchanges without a response become `ApiError::Transport`. Multipart
//! forms are encoded with `reqwest::blocking::multipart`.
//!
//! The blocking client runs its own runtime, so it must not be built or
//! dropped inside an async context.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::Method;

use crate::error::{ApiError, Result};
use crate::form::{MultipartForm, FILE_CONTENT_TYPE};
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, RequestBody};

pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Applies `timeout` to each whole request, connect to last body byte.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client })
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn multipart_form(form: &MultipartForm) -> Result<multipart::Form> {
    let mut encoded = multipart::Form::new();
    for (name, value) in form.fields() {
        encoded = encoded.text(name.clone(), value.clone());
    }
    for file in form.files() {
        let part = multipart::Part::bytes(file.content.clone())
            .file_name(file.filename.clone())
            .mime_str(FILE_CONTENT_TYPE)
            .map_err(transport_error)?;
        encoded = encoded.part(file.name.clone(), part);
    }
    Ok(encoded)
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            None => builder,
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes.clone()),
            Some(RequestBody::Multipart(form)) => builder.multipart(multipart_form(form)?),
        };

        let response = builder.send().map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().map_err(transport_error)?.to_vec();

        Ok(HttpResponse { status, headers, body })
    }
}
