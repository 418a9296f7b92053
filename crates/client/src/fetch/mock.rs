//! In-process [`Network`] double for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use infovault_core::{Error, Request, Response};

use super::Network;

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: Bytes },
    Fail(String),
    Reject(String),
}

/// Scripted network keyed by absolute URL.
///
/// Unscripted URLs fail like an unreachable host. Every call is recorded,
/// including failed ones.
#[derive(Debug, Default)]
pub struct MockNetwork {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`.
    pub fn respond(&self, url: &str, status: u16, body: impl Into<Bytes>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Respond { status, body: body.into() });
        self
    }

    /// Fail `url` with a transport error.
    pub fn fail(&self, url: &str, reason: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Fail(reason.to_string()));
        self
    }

    /// Refuse `url` before it reaches the wire, like an unsupported method.
    pub fn reject(&self, url: &str, reason: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Reject(reason.to_string()));
        self
    }

    /// Fail every request regardless of script.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {url}")));
        }

        let reply = self.replies.lock().unwrap().get(&url).cloned();
        match reply {
            Some(Reply::Respond { status, body }) => Ok(Response {
                url,
                status,
                headers: vec![("content-type".to_string(), "text/plain".to_string())],
                body,
            }),
            Some(Reply::Fail(reason)) => Err(Error::Network(reason)),
            Some(Reply::Reject(reason)) => Err(Error::InvalidInput(reason)),
            None => Err(Error::Network(format!("unreachable: {url}"))),
        }
    }
}
