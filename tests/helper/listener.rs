//! In-memory listeners whose failures are scripted by the test

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::DuplexStream;
use tokio::sync::oneshot;

use host_proxy::ipc::{Binder, Listener};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Bound(String),
    Closed(String),
}

/// Binder that never touches the host; bind and accept failures are injected
#[derive(Default)]
pub struct ScriptedBinder {
    fail_bind: HashSet<String>,
    triggers: Mutex<HashMap<String, oneshot::Receiver<io::Error>>>,
    panics: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    events: Arc<Mutex<Vec<ListenerEvent>>>,
}

#[allow(dead_code)]
impl ScriptedBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make binding `address` fail with `AddrInUse`
    pub fn fail_bind(mut self, address: &str) -> Self {
        self.fail_bind.insert(address.to_string());
        self
    }

    /// Sending on the returned channel makes `accept` on `address` fail
    pub fn accept_failure(&self, address: &str) -> oneshot::Sender<io::Error> {
        let (tx, rx) = oneshot::channel();
        self.triggers
            .lock()
            .unwrap()
            .insert(address.to_string(), rx);
        tx
    }

    /// Sending on the returned channel makes `accept` on `address` panic
    pub fn accept_panic(&self, address: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.panics.lock().unwrap().insert(address.to_string(), rx);
        tx
    }

    pub fn events(&self) -> Arc<Mutex<Vec<ListenerEvent>>> {
        self.events.clone()
    }
}

impl Binder for ScriptedBinder {
    type Listener = ScriptedListener;

    fn bind(&self, address: &str) -> io::Result<ScriptedListener> {
        if self.fail_bind.contains(address) {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("{address} is taken"),
            ));
        }
        self.events
            .lock()
            .unwrap()
            .push(ListenerEvent::Bound(address.to_string()));
        Ok(ScriptedListener {
            address: address.to_string(),
            trigger: self.triggers.lock().unwrap().remove(address),
            panic: self.panics.lock().unwrap().remove(address),
            events: self.events.clone(),
        })
    }
}

pub struct ScriptedListener {
    address: String,
    trigger: Option<oneshot::Receiver<io::Error>>,
    panic: Option<oneshot::Receiver<()>>,
    events: Arc<Mutex<Vec<ListenerEvent>>>,
}

#[async_trait]
impl Listener for ScriptedListener {
    type Stream = DuplexStream;

    fn address(&self) -> &str {
        &self.address
    }

    async fn accept(&mut self) -> io::Result<DuplexStream> {
        if let Some(panic) = self.panic.as_mut() {
            let outcome = panic.await;
            self.panic = None;
            if outcome.is_ok() {
                panic!("scripted accept panic on {}", self.address);
            }
        }
        if let Some(trigger) = self.trigger.as_mut() {
            let outcome = trigger.await;
            self.trigger = None;
            if let Ok(e) = outcome {
                return Err(e);
            }
        }
        std::future::pending().await
    }

    fn close(self) -> io::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(ListenerEvent::Closed(self.address.clone()));
        Ok(())
    }
}
