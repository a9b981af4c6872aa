//! RPC server for a single (group, version) endpoint
//!
//! A server owns the method table a registrant attached to it and serves it
//! on one listener. Connections are handled concurrently; calls within one
//! connection are handled in order.

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodecError};
use tracing::{debug, info, warn};

use crate::ipc::Listener;
use crate::rpc::error::{RpcError, ServeError};
use crate::rpc::message::{
    EndpointInfo, ErrorCode, ErrorObject, MAX_MESSAGE_LEN, Request, Response, VERSION_METHOD,
    line_codec,
};
use crate::version::ApiVersion;

/// What a handler knows about the call beyond its params
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub group: String,
    /// Version the caller negotiated by connecting to this endpoint
    pub version: ApiVersion,
}

/// A request handler attached to an [`RpcServer`]
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: Arc<CallContext>, params: Value) -> Result<Value, RpcError>;
}

/// Adapts a typed async closure to [`Handler`]
struct FnHandler<F, P, R> {
    f: F,
    _marker: PhantomData<fn(P) -> R>,
}

#[async_trait::async_trait]
impl<F, Fut, P, R> Handler for FnHandler<F, P, R>
where
    F: Fn(Arc<CallContext>, P) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, RpcError>> + Send,
    P: DeserializeOwned + Send,
    R: Serialize + Send,
{
    async fn call(&self, ctx: Arc<CallContext>, params: Value) -> Result<Value, RpcError> {
        let params: P = serde_json::from_value(params)?;
        let result = (self.f)(ctx, params).await?;
        serde_json::to_value(result).map_err(|e| RpcError::Internal(e.to_string()))
    }
}

/// Stops a server; safe to use any number of times, before or after serving ends
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

pub struct RpcServer {
    context: Arc<CallContext>,
    handlers: HashMap<String, Arc<dyn Handler>>,
    stop: StopHandle,
}

impl RpcServer {
    pub fn new(group: impl Into<String>, version: ApiVersion) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            context: Arc::new(CallContext {
                group: group.into(),
                version,
            }),
            handlers: HashMap::new(),
            stop: StopHandle { tx: Arc::new(tx) },
        }
    }

    pub fn group(&self) -> &str {
        &self.context.group
    }

    pub fn version(&self) -> &ApiVersion {
        &self.context.version
    }

    /// Attach a handler; a later registration for the same method replaces it
    pub fn register(&mut self, method: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Attach a typed async function as the handler for `method`
    pub fn handle<F, Fut, P, R>(&mut self, method: impl Into<String>, f: F)
    where
        F: Fn(Arc<CallContext>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcError>> + Send + 'static,
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
    {
        self.register(
            method,
            FnHandler {
                f,
                _marker: PhantomData,
            },
        );
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Serve on `listener` until stopped or the listener fails.
    ///
    /// Open connections are dropped once serving ends, and the listener is
    /// closed in both cases.
    pub async fn serve<L: Listener>(self, mut listener: L) -> Result<(), ServeError> {
        let address = listener.address().to_string();
        let mut stop_rx = self.stop.tx.subscribe();
        let dispatcher = Arc::new(Dispatcher {
            context: self.context,
            handlers: self.handlers,
        });
        let mut connections = JoinSet::new();

        info!(
            "Serving {} {} on {}",
            dispatcher.context.group, dispatcher.context.version, address
        );

        let result = loop {
            tokio::select! {
                _ = stop_rx.wait_for(|stopped| *stopped) => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok(stream) => {
                        let dispatcher = dispatcher.clone();
                        connections.spawn(async move {
                            if let Err(e) = dispatcher.serve_connection(stream).await {
                                debug!("Connection closed with error: {}", e);
                            }
                        });
                    }
                    Err(source) => {
                        break Err(ServeError::Accept {
                            address: address.clone(),
                            source,
                        });
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        };

        connections.shutdown().await;
        if let Err(e) = listener.close() {
            warn!("Failed to close listener {}: {}", address, e);
        }
        info!(
            "Stopped serving {} {} on {}",
            dispatcher.context.group, dispatcher.context.version, address
        );

        result
    }
}

struct Dispatcher {
    context: Arc<CallContext>,
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Dispatcher {
    /// Answer requests until the peer hangs up.
    ///
    /// An oversized message gets a `parse_error` response and ends the
    /// connection, since the rest of it is never read.
    async fn serve_connection<S>(&self, stream: S) -> Result<(), LinesCodecError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let (reader, writer) = tokio::io::split(stream);
        let mut requests = FramedRead::new(reader, line_codec());
        let mut responses = FramedWrite::new(writer, line_codec());

        while let Some(line) = requests.next().await {
            let (response, keep_open) = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => (self.dispatch_line(&line).await, true),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(
                        "{} {}: rejected message over {} bytes",
                        self.context.group, self.context.version, MAX_MESSAGE_LEN
                    );
                    let error = ErrorObject {
                        code: ErrorCode::ParseError,
                        message: format!("Message exceeds {MAX_MESSAGE_LEN} bytes"),
                    };
                    (Response::failure(0, error), false)
                }
                Err(e) => return Err(e),
            };

            let payload = serde_json::to_string(&response).map_err(std::io::Error::from)?;
            responses.send(payload).await?;
            if !keep_open {
                break;
            }
        }

        Ok(())
    }

    async fn dispatch_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => Response::failure(
                0,
                ErrorObject {
                    code: ErrorCode::ParseError,
                    message: e.to_string(),
                },
            ),
        }
    }

    async fn dispatch(&self, request: Request) -> Response {
        debug!(
            "{} {}: {}",
            self.context.group, self.context.version, request.method
        );

        if request.method == VERSION_METHOD {
            let info = EndpointInfo {
                group: self.context.group.clone(),
                version: self.context.version.clone(),
            };
            return match serde_json::to_value(info) {
                Ok(value) => Response::success(request.id, value),
                Err(e) => Response::failure(
                    request.id,
                    RpcError::Internal(e.to_string()).to_object(),
                ),
            };
        }

        let Some(handler) = self.handlers.get(&request.method) else {
            return Response::failure(
                request.id,
                RpcError::MethodNotFound(request.method).to_object(),
            );
        };

        match handler.call(self.context.clone(), request.params).await {
            Ok(value) => Response::success(request.id, value),
            Err(e) => {
                debug!("{} failed: {}", request.method, e);
                Response::failure(request.id, e.to_object())
            }
        }
    }
}
