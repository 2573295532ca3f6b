//! Fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::auth::AuthProvider;
use crate::error::{ApiError, Result};
use crate::http::{HttpExecutor, HttpRequest, HttpResponse};

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpExecutor for ScriptedExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no scripted response left".to_string()))
    }
}

/// Static token that counts how often it was handed out and reset.
#[derive(Default)]
pub struct CountingAuth {
    pub issued: AtomicUsize,
    pub resets: AtomicUsize,
}

impl CountingAuth {
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl AuthProvider for CountingAuth {
    fn access_token(&self) -> Result<String> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok("test-token".to_string())
    }

    fn token_type(&self) -> String {
        "Bearer".to_string()
    }

    fn reset_token(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
