#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, path::Path, rc::Rc};

use serde_json::Value;
use spofeed::{
    config::SpotifyConfig,
    spotify::http::{ApiError, HttpRequest, HttpResponse, HttpTransport},
};

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Transport that replays scripted responses in order and records every
/// request. Clones share the same script.
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Rc<RefCell<Script>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) -> &Self {
        self.script.borrow_mut().responses.push_back(response);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(json_response(status, body))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }

    pub fn boxed(&self) -> Box<dyn HttpTransport> {
        Box::new(self.clone())
    }
}

impl HttpTransport for FakeTransport {
    fn perform(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.clone());
        script
            .responses
            .pop_front()
            .ok_or_else(|| ApiError::Transport(format!("no scripted response for {}", request.url)))
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: Default::default(),
        body: body.to_string(),
    }
}

pub fn with_header(mut response: HttpResponse, name: &str, value: &str) -> HttpResponse {
    response
        .headers
        .insert(name.to_ascii_lowercase(), value.to_string());
    response
}

pub fn test_config(dir: &Path) -> SpotifyConfig {
    SpotifyConfig::with_cache_file(dir.join("spotify_cache"))
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
