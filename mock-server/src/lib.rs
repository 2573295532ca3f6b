//! In-memory stand-in for the Smartling Auth and Files APIs.
//!
//! Serves the endpoints `smartling-files` calls, wrapped in the same
//! `{"response": {...}}` envelope. Credentials are fixed
//! (`USER_IDENTIFIER` / `USER_SECRET`); every Files route requires a bearer
//! token issued by `/auth-api/v2/authenticate`. Form booleans must be sent as
//! `1`/`0`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USER_IDENTIFIER: &str = "mock-user";
pub const USER_SECRET: &str = "mock-secret";
pub const MOCK_TIMESTAMP: &str = "2026-01-01T00:00:00Z";

const TOKEN_TTL_SECS: u64 = 480;
const REFRESH_TTL_SECS: u64 = 3660;
const PROJECTS: &str = "/files-api/v2/projects/{project_id}";

#[derive(Clone, Debug)]
pub struct Translation {
    pub content: Vec<u8>,
    pub state: String,
}

#[derive(Clone, Debug)]
pub struct StoredFile {
    pub file_uri: String,
    pub file_type: String,
    pub content: Vec<u8>,
    pub authorized_locales: BTreeSet<String>,
    pub translations: HashMap<String, Translation>,
}

impl StoredFile {
    fn string_count(&self) -> usize {
        String::from_utf8_lossy(&self.content)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()
    }

    fn word_count(&self) -> usize {
        String::from_utf8_lossy(&self.content).split_whitespace().count()
    }

    /// Authorized locales plus every locale that has a translation.
    fn locales(&self) -> Vec<String> {
        let mut locales = self.authorized_locales.clone();
        locales.extend(self.translations.keys().cloned());
        locales.into_iter().collect()
    }

    fn locale_status(&self, locale: &str) -> Value {
        let total = self.string_count();
        let words = self.word_count();
        let (completed, completed_words) = if self.translations.contains_key(locale) {
            (total, words)
        } else {
            (0, 0)
        };
        let authorized = if self.authorized_locales.contains(locale) {
            total - completed
        } else {
            0
        };
        let authorized_words = if authorized > 0 { words } else { 0 };
        json!({
            "localeId": locale,
            "authorizedStringCount": authorized,
            "authorizedWordCount": authorized_words,
            "completedStringCount": completed,
            "completedWordCount": completed_words,
            "excludedStringCount": 0,
            "excludedWordCount": 0,
        })
    }

    fn summary(&self) -> Value {
        json!({
            "fileUri": self.file_uri,
            "fileType": self.file_type,
            "lastUploaded": MOCK_TIMESTAMP,
            "hasInstructions": false,
        })
    }
}

#[derive(Default)]
pub struct MockState {
    files: RwLock<HashMap<(String, String), StoredFile>>,
    tokens: RwLock<HashSet<String>>,
    refresh_tokens: RwLock<HashSet<String>>,
}

impl MockState {
    /// Invalidate every issued access token; refresh tokens stay valid.
    /// Must be called from outside the server's runtime.
    pub fn revoke_access_tokens(&self) {
        self.tokens.blocking_write().clear();
    }

    pub async fn file(&self, project_id: &str, file_uri: &str) -> Option<StoredFile> {
        self.files
            .read()
            .await
            .get(&(project_id.to_string(), file_uri.to_string()))
            .cloned()
    }
}

pub type Db = Arc<MockState>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/auth-api/v2/authenticate", post(authenticate))
        .route("/auth-api/v2/authenticate/refresh", post(refresh))
        .route(&format!("{PROJECTS}/file"), post(upload_file))
        .route(&format!("{PROJECTS}/files/list"), get(list_files))
        .route(&format!("{PROJECTS}/file/rename"), post(rename_file))
        .route(&format!("{PROJECTS}/file/delete"), post(delete_file))
        .route(&format!("{PROJECTS}/file/status"), get(status_all_locales))
        .route(&format!("{PROJECTS}/file/authorized-locales"), get(authorized_locales))
        .route(&format!("{PROJECTS}/file/last-modified"), get(last_modified))
        .route(&format!("{PROJECTS}/locales/{{locale}}/file"), get(download_file))
        .route(&format!("{PROJECTS}/locales/{{locale}}/file/status"), get(locale_status))
        .route(&format!("{PROJECTS}/locales/{{locale}}/file/import"), post(import_translations))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::default()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Failure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR", message)
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    fn not_found(file_uri: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND_ERROR",
            format!("File not found: {file_uri}"),
        )
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = json!({
            "response": {
                "code": self.code,
                "errors": [{ "key": self.code.to_lowercase(), "message": self.message, "details": null }],
            }
        });
        (self.status, Json(body)).into_response()
    }
}

fn success(data: Value) -> Json<Value> {
    Json(json!({ "response": { "code": "SUCCESS", "data": data } }))
}

fn success_empty() -> Json<Value> {
    Json(json!({ "response": { "code": "SUCCESS" } }))
}

async fn require_token(db: &MockState, headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Failure::unauthorized("Missing bearer token"))?;
    if db.tokens.read().await.contains(token) {
        Ok(())
    } else {
        Err(Failure::unauthorized("Invalid token"))
    }
}

// ---------------------------------------------------------------------------
// Request decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Form {
    fields: Vec<(String, String)>,
    file: Option<Vec<u8>>,
}

impl Form {
    async fn read(mut multipart: Multipart) -> Result<Self, Failure> {
        let mut form = Form::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Failure::validation(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let bytes = field.bytes().await.map_err(|e| Failure::validation(e.to_string()))?;
                form.file = Some(bytes.to_vec());
            } else {
                let value = field.text().await.map_err(|e| Failure::validation(e.to_string()))?;
                form.fields.push((name, value));
            }
        }
        Ok(form)
    }

    fn get(&self, name: &str) -> Option<&str> {
        lookup(&self.fields, name)
    }

    fn require(&self, name: &str) -> Result<&str, Failure> {
        required(&self.fields, name)
    }

    fn all(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn flag(&self, name: &str) -> Result<Option<bool>, Failure> {
        match self.get(name) {
            None => Ok(None),
            Some("1") => Ok(Some(true)),
            Some("0") => Ok(Some(false)),
            Some(other) => Err(Failure::validation(format!("{name} must be 1 or 0, got {other}"))),
        }
    }

    fn take_file(&mut self) -> Result<Vec<u8>, Failure> {
        self.file.take().ok_or_else(|| Failure::validation("file is required"))
    }
}

type QueryPairs = Vec<(String, String)>;

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn required<'a>(pairs: &'a [(String, String)], name: &str) -> Result<&'a str, Failure> {
    lookup(pairs, name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Failure::validation(format!("{name} is required")))
}

async fn find_file(db: &MockState, project_id: &str, file_uri: &str) -> Result<StoredFile, Failure> {
    db.file(project_id, file_uri)
        .await
        .ok_or_else(|| Failure::not_found(file_uri))
}

// ---------------------------------------------------------------------------
// Auth API
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub user_identifier: String,
    pub user_secret: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

async fn issue_token(db: &MockState) -> Value {
    let access_token = format!("access-{}", Uuid::new_v4());
    let refresh_token = format!("refresh-{}", Uuid::new_v4());
    db.tokens.write().await.insert(access_token.clone());
    db.refresh_tokens.write().await.insert(refresh_token.clone());
    json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "expiresIn": TOKEN_TTL_SECS,
        "refreshExpiresIn": REFRESH_TTL_SECS,
        "tokenType": "Bearer",
    })
}

async fn authenticate(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<Value>, Failure> {
    if input.user_identifier != USER_IDENTIFIER || input.user_secret != USER_SECRET {
        return Err(Failure::unauthorized("Invalid user identifier or secret"));
    }
    Ok(success(issue_token(&db).await))
}

async fn refresh(
    State(db): State<Db>,
    Json(input): Json<RefreshRequest>,
) -> Result<Json<Value>, Failure> {
    if !db.refresh_tokens.write().await.remove(&input.refresh_token) {
        return Err(Failure::unauthorized("Invalid refresh token"));
    }
    Ok(success(issue_token(&db).await))
}

// ---------------------------------------------------------------------------
// Files API
// ---------------------------------------------------------------------------

async fn upload_file(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let mut form = Form::read(multipart).await?;
    let file_uri = form.require("fileUri")?.to_string();
    let file_type = form.require("fileType")?.to_string();
    form.flag("authorize")?;
    let locales = form.all("localeIdsToAuthorize[]");
    let content = form.take_file()?;

    let mut files = db.files.write().await;
    let key = (project_id, file_uri.clone());
    let over_written = files.contains_key(&key);
    let stored = files.entry(key).or_insert_with(|| StoredFile {
        file_uri,
        file_type: String::new(),
        content: Vec::new(),
        authorized_locales: BTreeSet::new(),
        translations: HashMap::new(),
    });
    stored.file_type = file_type;
    stored.content = content;
    stored.authorized_locales.extend(locales);

    Ok(success(json!({
        "overWritten": over_written,
        "stringCount": stored.string_count(),
        "wordCount": stored.word_count(),
    })))
}

async fn download_file(
    State(db): State<Db>,
    Path((project_id, locale)): Path<(String, String)>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Response, Failure> {
    require_token(&db, &headers).await?;
    let file_uri = required(&query, "fileUri")?;
    let stored = find_file(&db, &project_id, file_uri).await?;
    let content = stored
        .translations
        .get(&locale)
        .map(|t| t.content.clone())
        .unwrap_or(stored.content);
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], content).into_response())
}

async fn locale_status(
    State(db): State<Db>,
    Path((project_id, locale)): Path<(String, String)>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let stored = find_file(&db, &project_id, required(&query, "fileUri")?).await?;
    let mut status = stored.locale_status(&locale);
    if let Value::Object(map) = &mut status {
        map.insert("fileUri".to_string(), json!(stored.file_uri));
        map.insert("fileType".to_string(), json!(stored.file_type));
        map.insert("totalStringCount".to_string(), json!(stored.string_count()));
        map.insert("totalWordCount".to_string(), json!(stored.word_count()));
        map.insert("lastUploaded".to_string(), json!(MOCK_TIMESTAMP));
    }
    Ok(success(status))
}

async fn status_all_locales(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let stored = find_file(&db, &project_id, required(&query, "fileUri")?).await?;
    let items: Vec<Value> = stored
        .locales()
        .iter()
        .map(|locale| stored.locale_status(locale))
        .collect();
    Ok(success(json!({
        "fileUri": stored.file_uri,
        "fileType": stored.file_type,
        "totalStringCount": stored.string_count(),
        "totalWordCount": stored.word_count(),
        "lastUploaded": MOCK_TIMESTAMP,
        "totalCount": items.len(),
        "items": items,
    })))
}

async fn list_files(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let uri_mask = lookup(&query, "uriMask").unwrap_or_default();
    let file_types: Vec<&str> = query
        .iter()
        .filter(|(k, _)| k == "fileTypes[]")
        .map(|(_, v)| v.as_str())
        .collect();
    let parse_number = |name: &str| -> Result<Option<usize>, Failure> {
        lookup(&query, name)
            .map(|raw| {
                raw.parse::<usize>()
                    .map_err(|_| Failure::validation(format!("{name} must be a number")))
            })
            .transpose()
    };
    let offset = parse_number("offset")?.unwrap_or(0);
    let limit = parse_number("limit")?.unwrap_or(500);

    let files = db.files.read().await;
    let mut matching: Vec<&StoredFile> = files
        .iter()
        .filter(|((project, _), _)| *project == project_id)
        .map(|(_, file)| file)
        .filter(|file| file.file_uri.contains(uri_mask))
        .filter(|file| file_types.is_empty() || file_types.contains(&file.file_type.as_str()))
        .collect();
    matching.sort_by(|a, b| a.file_uri.cmp(&b.file_uri));

    let total = matching.len();
    let items: Vec<Value> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(StoredFile::summary)
        .collect();
    Ok(success(json!({ "totalCount": total, "items": items })))
}

async fn rename_file(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let form = Form::read(multipart).await?;
    let file_uri = form.require("fileUri")?;
    let new_file_uri = form.require("newFileUri")?;

    let mut files = db.files.write().await;
    let new_key = (project_id.clone(), new_file_uri.to_string());
    if files.contains_key(&new_key) {
        return Err(Failure::validation(format!("File already exists: {new_file_uri}")));
    }
    let mut stored = files
        .remove(&(project_id, file_uri.to_string()))
        .ok_or_else(|| Failure::not_found(file_uri))?;
    stored.file_uri = new_file_uri.to_string();
    files.insert(new_key, stored);
    Ok(success_empty())
}

async fn delete_file(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let form = Form::read(multipart).await?;
    let file_uri = form.require("fileUri")?;
    db.files
        .write()
        .await
        .remove(&(project_id, file_uri.to_string()))
        .map(|_| success_empty())
        .ok_or_else(|| Failure::not_found(file_uri))
}

async fn import_translations(
    State(db): State<Db>,
    Path((project_id, locale)): Path<(String, String)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let mut form = Form::read(multipart).await?;
    let file_uri = form.require("fileUri")?.to_string();
    form.require("fileType")?;
    let state = form.require("translationState")?.to_string();
    if state != "PUBLISHED" && state != "POST_TRANSLATION" {
        return Err(Failure::validation(format!("Unknown translationState: {state}")));
    }
    let overwrite = form.flag("overwrite")?.unwrap_or(false);
    let content = form.take_file()?;

    let mut files = db.files.write().await;
    let stored = files
        .get_mut(&(project_id, file_uri.clone()))
        .ok_or_else(|| Failure::not_found(&file_uri))?;
    let imported = String::from_utf8_lossy(&content);
    let string_count = imported.lines().filter(|line| !line.trim().is_empty()).count();
    let word_count = imported.split_whitespace().count();

    if overwrite || !stored.translations.contains_key(&locale) {
        stored.translations.insert(locale, Translation { content, state });
    }
    Ok(success(json!({
        "stringCount": string_count,
        "wordCount": word_count,
        "translationImportErrors": [],
    })))
}

async fn authorized_locales(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let stored = find_file(&db, &project_id, required(&query, "fileUri")?).await?;
    let items: Vec<&String> = stored.authorized_locales.iter().collect();
    Ok(success(json!({ "items": items })))
}

async fn last_modified(
    State(db): State<Db>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<Json<Value>, Failure> {
    require_token(&db, &headers).await?;
    let stored = find_file(&db, &project_id, required(&query, "fileUri")?).await?;
    let items: Vec<Value> = stored
        .locales()
        .into_iter()
        .map(|locale| json!({ "localeId": locale, "lastModified": MOCK_TIMESTAMP }))
        .collect();
    Ok(success(json!({ "totalCount": items.len(), "items": items })))
}
