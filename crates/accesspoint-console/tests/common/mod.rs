//! Scripted backend shared by the controller flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::Mutex;

use accesspoint_console::{Backend, ConsoleError, JsonReply};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

/// What the fake answers to the next request.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(u16, Value),
    /// Connection-level failure with this message.
    Fail(&'static str),
}

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Lookup(String),
    Submit { action: String, body: Value },
}

#[derive(Default)]
pub struct FakeBackend {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
    busy_probe: Mutex<Option<watch::Receiver<bool>>>,
    busy_seen: Mutex<Vec<bool>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(status, body));
        self
    }

    pub fn fail(&self, message: &'static str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message));
        self
    }

    /// Record the busy state of `rx` whenever a request arrives.
    pub fn probe_busy(&self, rx: watch::Receiver<bool>) {
        *self.busy_probe.lock().unwrap() = Some(rx);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn busy_seen(&self) -> Vec<bool> {
        self.busy_seen.lock().unwrap().clone()
    }

    fn next(&self, call: Call) -> Result<JsonReply, ConsoleError> {
        self.calls.lock().unwrap().push(call);
        if let Some(rx) = self.busy_probe.lock().unwrap().as_ref() {
            self.busy_seen.lock().unwrap().push(*rx.borrow());
        }

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(status, body)) => Ok(JsonReply::new(status, body)),
            Some(Scripted::Fail(message)) => Err(ConsoleError::Io(std::io::Error::new(
                ErrorKind::ConnectionRefused,
                message,
            ))),
            None => panic!("unexpected request: no scripted response left"),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn lookup_user_ips(&self, username: &str) -> Result<JsonReply, ConsoleError> {
        self.next(Call::Lookup(username.to_string()))
    }

    async fn submit(&self, action: &str, body: &Value) -> Result<JsonReply, ConsoleError> {
        self.next(Call::Submit {
            action: action.to_string(),
            body: body.clone(),
        })
    }
}
