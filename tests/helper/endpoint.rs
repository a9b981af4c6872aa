//! Registrants and startup helpers shared by the aggregator tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use host_proxy::ipc::Binder;
use host_proxy::rpc::{CallContext, RpcError, RpcServer};
use host_proxy::server::{ApiGroupVersion, ServerAggregator, StartError};
use host_proxy::version::{ApiVersion, require_version};

/// Entry whose registrant counts how many servers it was attached to
pub fn counted_entry(
    group: &str,
    version: &str,
    registrations: Arc<AtomicUsize>,
) -> ApiGroupVersion {
    ApiGroupVersion::new(group, ApiVersion::must(version), move |server: &mut RpcServer| {
        registrations.fetch_add(1, Ordering::SeqCst);
        server.handle("Ping", |_, _: ()| async { Ok::<_, RpcError>("pong") });
        server.handle("Resize", |ctx: Arc<CallContext>, size: u64| async move {
            require_version("Resize", &ctx.version, &ApiVersion::must("v1"))?;
            Ok::<_, RpcError>(size)
        });
    })
}

/// Spawn `start` and wait until it reports ready.
///
/// Returns the join handle of the running `start` call.
#[allow(dead_code)]
pub async fn start_and_wait<B>(
    aggregator: Arc<ServerAggregator<B>>,
) -> tokio::task::JoinHandle<Result<(), StartError>>
where
    B: Binder + 'static,
{
    let (ready_tx, ready_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        aggregator
            .start_with(move || {
                let _ = ready_tx.send(());
            })
            .await
    });
    ready_rx.await.expect("aggregator never became ready");
    handle
}
