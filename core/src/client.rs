//! Files API client and its shared request pipeline.
//!
//! # Design
//! Every public operation builds a `Params` map and hands it to the same
//! pipeline: encode the body (query string for GET/DELETE, multipart form
//! otherwise), attach the bearer token, execute, reset the token on 401, and
//! unwrap the response envelope. Operations differ only in path, method and
//! injected parameters.
//!
//! `build_request` and `parse_response` are the pure halves of the pipeline
//! and can be exercised without an executor.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::auth::{AuthProvider, TokenProvider};
use crate::config::ClientConfig;
use crate::envelope;
use crate::error::{ApiError, Result};
use crate::form::{self, FilePart, MultipartForm};
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::params::{Params, FILE_PARAM};
use crate::transport::ReqwestExecutor;
use crate::types::{FileType, TranslationState};

pub const DEFAULT_BASE_URL: &str = "https://api.smartling.com/files-api/v2/projects";

/// Synchronous client for one Smartling project.
#[derive(Clone)]
pub struct FileApiClient {
    project_id: String,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
    executor: Arc<dyn HttpExecutor>,
}

impl fmt::Debug for FileApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileApiClient")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FileApiClient {
    pub fn new(project_id: &str, auth: Arc<dyn AuthProvider>, executor: Arc<dyn HttpExecutor>) -> Self {
        Self::with_base_url(project_id, None, auth, executor)
    }

    /// `base_url` replaces `DEFAULT_BASE_URL`; the project id is still
    /// appended as the last path segment.
    pub fn with_base_url(
        project_id: &str,
        base_url: Option<&str>,
        auth: Arc<dyn AuthProvider>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        let root = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        Self {
            project_id: project_id.to_string(),
            base_url: format!("{root}/{project_id}"),
            auth,
            executor,
        }
    }

    /// Default `reqwest` transport and a `TokenProvider` signing in with the
    /// given credentials.
    pub fn from_credentials(user_identifier: &str, user_secret: &str, project_id: &str) -> Result<Self> {
        let executor: Arc<dyn HttpExecutor> = Arc::new(ReqwestExecutor::new()?);
        let auth = Arc::new(TokenProvider::new(user_identifier, user_secret, executor.clone()));
        Ok(Self::new(project_id, auth, executor))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let executor: Arc<dyn HttpExecutor> = match config.timeout_ms {
            Some(ms) => Arc::new(ReqwestExecutor::with_timeout(Duration::from_millis(ms))?),
            None => Arc::new(ReqwestExecutor::new()?),
        };
        let auth: Arc<dyn AuthProvider> = match config.auth_url.as_deref() {
            Some(url) => Arc::new(TokenProvider::with_auth_url(
                config.user_identifier.as_str(),
                config.user_secret.as_str(),
                url,
                executor.clone(),
            )),
            None => Arc::new(TokenProvider::new(
                config.user_identifier.as_str(),
                config.user_secret.as_str(),
                executor.clone(),
            )),
        };
        Ok(Self::with_base_url(
            &config.project_id,
            config.base_url.as_deref(),
            auth,
            executor,
        ))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Build an unauthenticated request for `uri` relative to the project.
    ///
    /// Reads the `file` parameter from disk for multipart methods, so a bad
    /// path fails here with `LocalIo` before anything touches the network.
    pub fn build_request(&self, uri: &str, params: Params, method: HttpMethod) -> Result<HttpRequest> {
        let mut url = format!("{}/{}", self.base_url, uri.trim_start_matches('/'));
        let headers = vec![("Accept".to_string(), "application/json".to_string())];

        let body = if method.uses_query() {
            let query = form::encode_query(&params);
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
            None
        } else {
            let (scalars, file) = params.take_file();
            let mut multipart = MultipartForm::from_params(&scalars);
            if let Some(path) = file {
                let content = std::fs::read(&path).map_err(|source| ApiError::LocalIo {
                    path: path.clone(),
                    source,
                })?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| FILE_PARAM.to_string());
                multipart.file(FilePart {
                    name: FILE_PARAM.to_string(),
                    filename,
                    content,
                });
            }
            Some(RequestBody::Multipart(multipart))
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Classify a response: error envelope for status >= 400, otherwise the
    /// success envelope's `data` (or `true`).
    pub fn parse_response(&self, response: &HttpResponse) -> Result<Value> {
        envelope::check_status(response)?;
        envelope::unwrap_data(&response.body)
    }

    /// Run the full pipeline and unwrap the JSON envelope.
    pub fn send_request(&self, uri: &str, params: Params, method: HttpMethod) -> Result<Value> {
        let response = self.dispatch(uri, params, method)?;
        envelope::unwrap_data(&response.body)
    }

    /// Run the pipeline up to error classification and return the raw body.
    pub fn send_raw_request(&self, uri: &str, params: Params, method: HttpMethod) -> Result<Vec<u8>> {
        let response = self.dispatch(uri, params, method)?;
        Ok(response.body)
    }

    fn dispatch(&self, uri: &str, params: Params, method: HttpMethod) -> Result<HttpResponse> {
        let mut request = self.build_request(uri, params, method)?;

        let token = self.auth.access_token()?;
        request
            .headers
            .push(("Authorization".to_string(), format!("{} {token}", self.auth.token_type())));

        debug!("{} {}", request.method, request.url);
        let response = self.executor.execute(&request)?;
        debug!("{} {} -> {}", request.method, request.url, response.status);

        if response.status == 401 {
            warn!("request rejected with 401, discarding cached token");
            self.auth.reset_token();
        }
        envelope::check_status(&response)?;
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Upload a local file under `file_uri`.
    pub fn upload_file(
        &self,
        path: impl AsRef<Path>,
        file_uri: &str,
        file_type: FileType,
        params: impl Into<Params>,
    ) -> Result<Value> {
        let mut params = params.into();
        params.extend(
            Params::new()
                .with_file(path)
                .with("fileUri", file_uri)
                .with("fileType", file_type.as_str()),
        );
        self.send_request("file", params, HttpMethod::Post)
    }

    /// Download the `locale` translation of `file_uri`. Returns `None` without
    /// contacting the API when `locale` is empty.
    pub fn download_file(
        &self,
        file_uri: &str,
        locale: &str,
        params: impl Into<Params>,
    ) -> Result<Option<Vec<u8>>> {
        if locale.is_empty() {
            return Ok(None);
        }
        let mut params = params.into();
        params.push("fileUri", file_uri);
        let body = self.send_raw_request(&locale_path(locale, "file"), params, HttpMethod::Get)?;
        Ok(Some(body))
    }

    pub fn get_status(&self, file_uri: &str, locale: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        self.send_request(&locale_path(locale, "file/status"), params, HttpMethod::Get)
    }

    pub fn get_list(&self, params: impl Into<Params>) -> Result<Value> {
        self.send_request("files/list", params.into(), HttpMethod::Get)
    }

    pub fn rename_file(&self, file_uri: &str, new_file_uri: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        params.push("newFileUri", new_file_uri);
        self.send_request("file/rename", params, HttpMethod::Post)
    }

    pub fn delete_file(&self, file_uri: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        self.send_request("file/delete", params, HttpMethod::Post)
    }

    /// Import existing translations for `locale` from a local file.
    pub fn import(
        &self,
        locale: &str,
        file_uri: &str,
        file_type: FileType,
        path: impl AsRef<Path>,
        translation_state: TranslationState,
        overwrite: bool,
    ) -> Result<Value> {
        let params = Params::new()
            .with("fileUri", file_uri)
            .with("fileType", file_type.as_str())
            .with_file(path)
            .with("translationState", translation_state.as_str())
            .with("overwrite", overwrite);
        self.send_request(&locale_path(locale, "file/import"), params, HttpMethod::Post)
    }

    pub fn get_authorized_locales(&self, file_uri: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        self.send_request("file/authorized-locales", params, HttpMethod::Get)
    }

    pub fn get_status_all_locales(&self, file_uri: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        self.send_request("file/status", params, HttpMethod::Get)
    }

    pub fn get_last_modified(&self, file_uri: &str, params: impl Into<Params>) -> Result<Value> {
        let mut params = params.into();
        params.push("fileUri", file_uri);
        self.send_request("file/last-modified", params, HttpMethod::Get)
    }
}

fn locale_path(locale: &str, rest: &str) -> String {
    format!("locales/{}/{rest}", urlencoding::encode(locale))
}
