//! Registered (group, version) pairs

use std::fmt;
use std::sync::Arc;

use crate::rpc::RpcServer;
use crate::version::ApiVersion;

/// Attaches one group/version's handlers to a fresh server
pub trait Registrant: Send + Sync {
    fn register(&self, server: &mut RpcServer);
}

impl<F> Registrant for F
where
    F: Fn(&mut RpcServer) + Send + Sync,
{
    fn register(&self, server: &mut RpcServer) {
        self(server)
    }
}

/// An operation group served at one API version
#[derive(Clone)]
pub struct ApiGroupVersion {
    pub group: String,
    pub version: ApiVersion,
    pub registrant: Arc<dyn Registrant>,
}

impl ApiGroupVersion {
    pub fn new(
        group: impl Into<String>,
        version: ApiVersion,
        registrant: impl Registrant + 'static,
    ) -> Self {
        Self {
            group: group.into(),
            version,
            registrant: Arc::new(registrant),
        }
    }
}

impl fmt::Debug for ApiGroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiGroupVersion")
            .field("group", &self.group)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_registrant_attaches_handlers() {
        let entry = ApiGroupVersion::new("disk", ApiVersion::must("v1"), |server: &mut RpcServer| {
            server.handle("Ping", |_, _: ()| async {
                Ok::<_, crate::rpc::RpcError>("pong")
            });
        });

        let mut server = RpcServer::new(entry.group.clone(), entry.version.clone());
        entry.registrant.register(&mut server);

        assert_eq!(server.methods(), vec!["Ping"]);
    }

    #[test]
    fn debug_omits_registrant() {
        let entry =
            ApiGroupVersion::new("volume", ApiVersion::must("v2alpha1"), |_: &mut RpcServer| {});
        let rendered = format!("{entry:?}");

        assert!(rendered.contains("volume"));
        assert!(rendered.contains(".."));
    }
}
