//! Host-local IPC listeners
//!
//! Unix hosts listen on a Unix domain socket at the endpoint address, Windows
//! hosts on a named pipe. Binding fails if a live endpoint or any non-socket
//! file holds the address. A socket file left by a process that exited
//! without closing it refuses connections and is replaced.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

#[cfg(unix)]
pub type ServerStream = tokio::net::UnixStream;

#[cfg(windows)]
pub type ServerStream = tokio::net::windows::named_pipe::NamedPipeServer;

/// A bound endpoint an RPC server accepts connections from
#[async_trait::async_trait]
pub trait Listener: Send + Sized + 'static {
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    fn address(&self) -> &str;

    /// Wait for the next client connection
    async fn accept(&mut self) -> io::Result<Self::Stream>;

    /// Stop listening and release the address
    fn close(self) -> io::Result<()>;
}

/// Opens listeners for endpoint addresses
pub trait Binder: Send + Sync {
    type Listener: Listener;

    fn bind(&self, address: &str) -> io::Result<Self::Listener>;
}

/// Binds real host IPC endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct IpcBinder;

impl Binder for IpcBinder {
    type Listener = IpcListener;

    fn bind(&self, address: &str) -> io::Result<IpcListener> {
        IpcListener::bind(address)
    }
}

#[derive(Debug)]
pub struct IpcListener {
    address: String,
    #[cfg(unix)]
    inner: tokio::net::UnixListener,
    #[cfg(unix)]
    closed: bool,
    #[cfg(windows)]
    next: tokio::net::windows::named_pipe::NamedPipeServer,
}

impl IpcListener {
    /// Bind the endpoint. Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn bind(address: &str) -> io::Result<Self> {
        let inner = match tokio::net::UnixListener::bind(address) {
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && is_stale_socket(address) => {
                warn!("Removing stale socket {}", address);
                std::fs::remove_file(address)?;
                tokio::net::UnixListener::bind(address)?
            }
            result => result?,
        };
        debug!("Bound unix socket {}", address);
        Ok(Self {
            address: address.to_string(),
            inner,
            closed: false,
        })
    }

    /// Bind the endpoint. Must be called from within a tokio runtime.
    #[cfg(windows)]
    pub fn bind(address: &str) -> io::Result<Self> {
        use tokio::net::windows::named_pipe::ServerOptions;

        let next = ServerOptions::new()
            .first_pipe_instance(true)
            .create(address)?;
        debug!("Created named pipe {}", address);
        Ok(Self {
            address: address.to_string(),
            next,
        })
    }
}

/// A socket file nobody is accepting on
#[cfg(unix)]
fn is_stale_socket(address: &str) -> bool {
    use std::os::unix::fs::FileTypeExt;

    let is_socket = std::fs::symlink_metadata(address)
        .map(|meta| meta.file_type().is_socket())
        .unwrap_or(false);
    is_socket
        && matches!(
            std::os::unix::net::UnixStream::connect(address),
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused
        )
}

#[async_trait::async_trait]
impl Listener for IpcListener {
    type Stream = ServerStream;

    fn address(&self) -> &str {
        &self.address
    }

    #[cfg(unix)]
    async fn accept(&mut self) -> io::Result<ServerStream> {
        let (stream, _) = self.inner.accept().await?;
        Ok(stream)
    }

    #[cfg(windows)]
    async fn accept(&mut self) -> io::Result<ServerStream> {
        use tokio::net::windows::named_pipe::ServerOptions;

        self.next.connect().await?;
        // The next instance must exist before the connected one is handed
        // out, otherwise clients briefly see no pipe at all.
        let fresh = ServerOptions::new().create(&self.address)?;
        Ok(std::mem::replace(&mut self.next, fresh))
    }

    #[cfg(unix)]
    fn close(mut self) -> io::Result<()> {
        self.closed = true;
        std::fs::remove_file(&self.address)
    }

    #[cfg(windows)]
    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for IpcListener {
    fn drop(&mut self) {
        if !self.closed {
            let _ = std::fs::remove_file(&self.address);
        }
    }
}
