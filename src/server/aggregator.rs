//! Serves every registered (group, version) pair on its own endpoint
//!
//! ```text
//!  NotStarted ──start()──▶ Listening ──first task ends──▶ Stopped
//!       │                                                   ▲
//!       └──────────────── bind failure ─────────────────────┘
//! ```
//!
//! Startup is all-or-nothing: listeners are opened in registration order and
//! if any fails every opened one is closed again before a single server is
//! created. Once serving, the first endpoint to stop (for any reason) stops
//! all of them, and `start` returns after every serving task has ended.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::ipc::{Binder, EndpointNamespace, IpcBinder, Listener};
use crate::rpc::{RpcServer, ServeError, StopHandle};
use crate::server::error::{EndpointError, ListenError, StartError, StopError};
use crate::server::group::ApiGroupVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    NotStarted,
    Listening,
    Stopped,
}

enum State {
    NotStarted,
    Listening(Vec<StopHandle>),
    Stopped,
}

pub struct ServerAggregator<B: Binder = IpcBinder> {
    namespace: EndpointNamespace,
    binder: B,
    entries: Vec<ApiGroupVersion>,
    state: Mutex<State>,
}

impl ServerAggregator {
    /// Aggregator over real IPC endpoints in the default namespace
    pub fn new(entries: Vec<ApiGroupVersion>) -> Self {
        Self::with_binder(EndpointNamespace::default(), IpcBinder, entries)
    }

    /// Aggregator over real IPC endpoints in `namespace`
    pub fn with_namespace(namespace: EndpointNamespace, entries: Vec<ApiGroupVersion>) -> Self {
        Self::with_binder(namespace, IpcBinder, entries)
    }
}

impl<B: Binder> ServerAggregator<B> {
    pub fn with_binder(
        namespace: EndpointNamespace,
        binder: B,
        entries: Vec<ApiGroupVersion>,
    ) -> Self {
        Self {
            namespace,
            binder,
            entries,
            state: Mutex::new(State::NotStarted),
        }
    }

    pub fn entries(&self) -> &[ApiGroupVersion] {
        &self.entries
    }

    /// Endpoint addresses in registration order
    pub fn addresses(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| self.namespace.address(&entry.group, &entry.version))
            .collect()
    }

    pub fn state(&self) -> AggregatorState {
        match *self.lock_state() {
            State::NotStarted => AggregatorState::NotStarted,
            State::Listening(_) => AggregatorState::Listening,
            State::Stopped => AggregatorState::Stopped,
        }
    }

    /// Serve every endpoint until the first one stops.
    pub async fn start(&self) -> Result<(), StartError> {
        self.start_with(|| {}).await
    }

    /// Serve every endpoint until the first one stops, calling `on_ready`
    /// once all endpoints are listening and all serving tasks are spawned.
    ///
    /// Returns after every serving task has ended. Errors from tasks that
    /// failed are reported together, each tagged with its group and version.
    pub async fn start_with<F>(&self, on_ready: F) -> Result<(), StartError>
    where
        F: FnOnce() + Send,
    {
        let (done_tx, mut done_rx) = mpsc::channel(self.entries.len().max(1));

        {
            let mut state = self.lock_state();
            if !matches!(*state, State::NotStarted) {
                return Err(StartError::AlreadyStarted);
            }

            let listeners = match self.bind_all() {
                Ok(listeners) => listeners,
                Err(errors) => {
                    *state = State::Stopped;
                    return Err(StartError::Listen(errors));
                }
            };

            let mut handles = Vec::with_capacity(listeners.len());
            for (index, (entry, listener)) in self.entries.iter().zip(listeners).enumerate() {
                let mut server = RpcServer::new(entry.group.clone(), entry.version.clone());
                entry.registrant.register(&mut server);
                handles.push(server.stop_handle());

                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let result = AssertUnwindSafe(server.serve(listener))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|panic| {
                            Err(ServeError::Panicked(panic_message(&*panic)))
                        });
                    // Capacity covers every task, so this never waits.
                    let _ = done_tx.send((index, result)).await;
                });
            }
            *state = State::Listening(handles);
        }
        drop(done_tx);

        info!("All {} endpoints are listening", self.entries.len());
        on_ready();

        let mut reported = vec![false; self.entries.len()];
        let mut errors = Vec::new();

        if let Some(first) = done_rx.recv().await {
            let (index, _) = &first;
            info!(
                "Endpoint {} {} stopped, shutting down all endpoints",
                self.entries[*index].group, self.entries[*index].version
            );
            let _ = self.stop();
            self.record(first, &mut reported, &mut errors);

            while let Some(done) = done_rx.recv().await {
                self.record(done, &mut reported, &mut errors);
            }
        }

        for (index, _) in reported.iter().enumerate().filter(|(_, seen)| !**seen) {
            let entry = &self.entries[index];
            error!("Serving task for {} {} vanished", entry.group, entry.version);
            errors.push((
                index,
                EndpointError {
                    group: entry.group.clone(),
                    version: entry.version.clone(),
                    source: ServeError::Vanished,
                },
            ));
        }

        *self.lock_state() = State::Stopped;

        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort_by_key(|(index, _)| *index);
            Err(StartError::Serve(errors.into_iter().map(|(_, e)| e).collect()))
        }
    }

    /// Ask every server to stop. `start` returns once they have.
    pub fn stop(&self) -> Result<(), StopError> {
        match &*self.lock_state() {
            State::NotStarted => Err(StopError::NotStarted),
            State::Listening(handles) => {
                handles.iter().for_each(StopHandle::stop);
                Ok(())
            }
            State::Stopped => Ok(()),
        }
    }

    fn record(
        &self,
        (index, result): (usize, Result<(), ServeError>),
        reported: &mut [bool],
        errors: &mut Vec<(usize, EndpointError)>,
    ) {
        reported[index] = true;
        if let Err(source) = result {
            let entry = &self.entries[index];
            error!("Endpoint {} {} failed: {}", entry.group, entry.version, source);
            errors.push((
                index,
                EndpointError {
                    group: entry.group.clone(),
                    version: entry.version.clone(),
                    source,
                },
            ));
        }
    }

    /// Open every listener or none of them
    fn bind_all(&self) -> Result<Vec<B::Listener>, Vec<ListenError>> {
        let mut listeners = Vec::with_capacity(self.entries.len());

        for address in self.addresses() {
            match self.binder.bind(&address) {
                Ok(listener) => listeners.push(listener),
                Err(source) => {
                    error!("Failed to listen on {}: {}", address, source);
                    let mut errors = vec![ListenError::Bind { address, source }];
                    for listener in listeners {
                        let address = listener.address().to_string();
                        if let Err(source) = listener.close() {
                            warn!("Failed to close {}: {}", address, source);
                            errors.push(ListenError::Close { address, source });
                        }
                    }
                    return Err(errors);
                }
            }
        }

        Ok(listeners)
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
