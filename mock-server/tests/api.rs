use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, USER_IDENTIFIER, USER_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;

const PROJECT: &str = "/files-api/v2/projects/p1";
const BOUNDARY: &str = "test-boundary";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

fn form_request(uri: &str, token: &str, fields: &[(&str, &str)], file: Option<&str>) -> Request<String> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(content) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

async fn sign_in(app: &Router) -> Value {
    let resp = app
        .clone()
        .oneshot(json_request(
            "/auth-api/v2/authenticate",
            json!({"userIdentifier": USER_IDENTIFIER, "userSecret": USER_SECRET}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["response"]["data"].clone()
}

async fn token(app: &Router) -> String {
    sign_in(app).await["accessToken"].as_str().unwrap().to_string()
}

async fn upload(app: &Router, token: &str, file_uri: &str, content: &str) -> Value {
    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("{PROJECT}/file"),
            token,
            &[("fileUri", file_uri), ("fileType", "plaintext"), ("localeIdsToAuthorize[]", "fr-FR")],
            Some(content),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- auth ---

#[tokio::test]
async fn authenticate_returns_bearer_token() {
    let data = sign_in(&app()).await;
    assert_eq!(data["tokenType"], "Bearer");
    assert!(data["accessToken"].as_str().unwrap().starts_with("access-"));
    assert!(data["expiresIn"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn authenticate_rejects_wrong_secret() {
    let resp = app()
        .oneshot(json_request(
            "/auth-api/v2/authenticate",
            json!({"userIdentifier": USER_IDENTIFIER, "userSecret": "nope"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["code"], "AUTHENTICATION_ERROR");
    assert!(body["response"]["errors"][0]["message"].is_string());
}

#[tokio::test]
async fn refresh_token_is_single_use() {
    let app = app();
    let refresh_token = sign_in(&app).await["refreshToken"].as_str().unwrap().to_string();

    let first = app
        .clone()
        .oneshot(json_request(
            "/auth-api/v2/authenticate/refresh",
            json!({"refreshToken": refresh_token}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(json_request(
            "/auth-api/v2/authenticate/refresh",
            json!({"refreshToken": refresh_token}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn files_routes_require_token() {
    let resp = app()
        .oneshot(get_request(&format!("{PROJECT}/files/list"), "bogus"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["errors"][0]["message"], "Invalid token");
}

// --- upload / list ---

#[tokio::test]
async fn upload_then_list() {
    let app = app();
    let token = token(&app).await;

    let body = upload(&app, &token, "docs/a.txt", "Hello world\nGood bye\n").await;
    assert_eq!(body["response"]["code"], "SUCCESS");
    assert_eq!(body["response"]["data"]["overWritten"], false);
    assert_eq!(body["response"]["data"]["stringCount"], 2);
    assert_eq!(body["response"]["data"]["wordCount"], 4);

    let again = upload(&app, &token, "docs/a.txt", "Hello\n").await;
    assert_eq!(again["response"]["data"]["overWritten"], true);

    upload(&app, &token, "other/b.txt", "B\n").await;

    let resp = app
        .oneshot(get_request(&format!("{PROJECT}/files/list?uriMask=docs"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let data = body_json(resp).await["response"]["data"].clone();
    assert_eq!(data["totalCount"], 1);
    assert_eq!(data["items"][0]["fileUri"], "docs/a.txt");
}

#[tokio::test]
async fn upload_rejects_textual_booleans() {
    let app = app();
    let token = token(&app).await;
    let resp = app
        .oneshot(form_request(
            &format!("{PROJECT}/file"),
            &token,
            &[("fileUri", "a.txt"), ("fileType", "plaintext"), ("authorize", "true")],
            Some("x"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = app();
    let token = token(&app).await;
    let resp = app
        .oneshot(form_request(
            &format!("{PROJECT}/file"),
            &token,
            &[("fileUri", "a.txt"), ("fileType", "plaintext")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- download / import ---

#[tokio::test]
async fn download_prefers_imported_translation() {
    let app = app();
    let token = token(&app).await;
    upload(&app, &token, "a.txt", "Hello\n").await;

    let resp = app
        .clone()
        .oneshot(get_request(&format!("{PROJECT}/locales/fr-FR/file?fileUri=a.txt"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"Hello\n");

    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("{PROJECT}/locales/fr-FR/file/import"),
            &token,
            &[
                ("fileUri", "a.txt"),
                ("fileType", "plaintext"),
                ("translationState", "PUBLISHED"),
                ("overwrite", "0"),
            ],
            Some("Bonjour\n"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["data"]["stringCount"], 1);

    let resp = app
        .oneshot(get_request(&format!("{PROJECT}/locales/fr-FR/file?fileUri=a.txt"), &token))
        .await
        .unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"Bonjour\n");
}

#[tokio::test]
async fn import_without_overwrite_keeps_existing() {
    let app = app();
    let token = token(&app).await;
    upload(&app, &token, "a.txt", "Hello\n").await;

    for (content, overwrite) in [("Bonjour\n", "1"), ("Salut\n", "0")] {
        let resp = app
            .clone()
            .oneshot(form_request(
                &format!("{PROJECT}/locales/fr-FR/file/import"),
                &token,
                &[
                    ("fileUri", "a.txt"),
                    ("fileType", "plaintext"),
                    ("translationState", "POST_TRANSLATION"),
                    ("overwrite", overwrite),
                ],
                Some(content),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(get_request(&format!("{PROJECT}/locales/fr-FR/file?fileUri=a.txt"), &token))
        .await
        .unwrap();
    assert_eq!(&body_bytes(resp).await[..], b"Bonjour\n");
}

#[tokio::test]
async fn download_missing_file_is_404_envelope() {
    let app = app();
    let token = token(&app).await;
    let resp = app
        .oneshot(get_request(&format!("{PROJECT}/locales/fr-FR/file?fileUri=nope.txt"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["errors"][0]["message"], "File not found: nope.txt");
}

// --- status / locales ---

#[tokio::test]
async fn status_endpoints_report_authorized_locale() {
    let app = app();
    let token = token(&app).await;
    upload(&app, &token, "a.txt", "one\ntwo\n").await;

    let resp = app
        .clone()
        .oneshot(get_request(&format!("{PROJECT}/locales/fr-FR/file/status?fileUri=a.txt"), &token))
        .await
        .unwrap();
    let data = body_json(resp).await["response"]["data"].clone();
    assert_eq!(data["fileUri"], "a.txt");
    assert_eq!(data["totalStringCount"], 2);
    assert_eq!(data["authorizedStringCount"], 2);

    let resp = app
        .clone()
        .oneshot(get_request(&format!("{PROJECT}/file/status?fileUri=a.txt"), &token))
        .await
        .unwrap();
    let data = body_json(resp).await["response"]["data"].clone();
    assert_eq!(data["items"][0]["localeId"], "fr-FR");

    let resp = app
        .clone()
        .oneshot(get_request(&format!("{PROJECT}/file/authorized-locales?fileUri=a.txt"), &token))
        .await
        .unwrap();
    let data = body_json(resp).await["response"]["data"].clone();
    assert_eq!(data["items"], json!(["fr-FR"]));

    let resp = app
        .oneshot(get_request(&format!("{PROJECT}/file/last-modified?fileUri=a.txt"), &token))
        .await
        .unwrap();
    let data = body_json(resp).await["response"]["data"].clone();
    assert_eq!(data["totalCount"], 1);
    assert_eq!(data["items"][0]["localeId"], "fr-FR");
}

// --- rename / delete ---

#[tokio::test]
async fn rename_then_delete() {
    let app = app();
    let token = token(&app).await;
    upload(&app, &token, "old.txt", "x\n").await;

    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("{PROJECT}/file/rename"),
            &token,
            &[("fileUri", "old.txt"), ("newFileUri", "new.txt")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"], json!({"code": "SUCCESS"}));

    let resp = app
        .clone()
        .oneshot(form_request(&format!("{PROJECT}/file/delete"), &token, &[("fileUri", "new.txt")], None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(form_request(&format!("{PROJECT}/file/delete"), &token, &[("fileUri", "new.txt")], None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_onto_existing_file_is_rejected() {
    let app = app();
    let token = token(&app).await;
    upload(&app, &token, "a.txt", "a\n").await;
    upload(&app, &token, "b.txt", "b\n").await;

    let resp = app
        .oneshot(form_request(
            &format!("{PROJECT}/file/rename"),
            &token,
            &[("fileUri", "a.txt"), ("newFileUri", "b.txt")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
