use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use docsync_core::BinaryFetcher;
use docsync_domain::FetchError;

use super::EventLog;

/// One scripted fetch outcome
#[derive(Debug, Clone)]
pub enum Response {
    Body(Vec<u8>),
    Fail(FetchError),
    /// Never resolves
    Hang,
}

type FetchHook = Box<dyn Fn(&str, usize) + Send + Sync>;

/// Fetcher answering from per-URL scripts.
///
/// Unscripted URLs return a small non-empty body.
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<String>>,
    events: EventLog,
    hook: Mutex<Option<FetchHook>>,
}

impl ScriptedFetcher {
    pub fn with_events(events: EventLog) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            events,
            hook: Mutex::new(None),
        }
    }

    pub fn body_for(url: &str) -> Vec<u8> {
        format!("%PDF-1.7 {url}").into_bytes()
    }

    /// Queue responses for `url`, consumed in order
    pub fn script(&self, url: &str, responses: Vec<Response>) {
        self.scripts.lock().unwrap().entry(url.to_string()).or_default().extend(responses);
    }

    /// Called with the URL and the 1-based call number before answering
    pub fn on_fetch<F>(&self, hook: F)
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl BinaryFetcher for ScriptedFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, FetchError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(source_url.to_string());
            calls.len()
        };
        self.events.lock().unwrap().push(format!("fetch:{source_url}"));

        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(source_url, call_number);
        }

        let scripted = self.scripts.lock().unwrap().get_mut(source_url).and_then(VecDeque::pop_front);
        match scripted {
            Some(Response::Body(body)) => Ok(body),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Hang) => {
                std::future::pending::<()>().await;
                Err(FetchError::Network("unreachable".to_string()))
            }
            None => Ok(Self::body_for(source_url)),
        }
    }
}
