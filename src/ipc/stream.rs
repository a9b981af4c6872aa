//! Client side of the IPC transport

use std::io;

#[cfg(unix)]
pub type ClientStream = tokio::net::UnixStream;

#[cfg(windows)]
pub type ClientStream = tokio::net::windows::named_pipe::NamedPipeClient;

/// Connect to the endpoint at `address`
#[cfg(unix)]
pub async fn connect(address: &str) -> io::Result<ClientStream> {
    tokio::net::UnixStream::connect(address).await
}

/// Connect to the endpoint at `address`, waiting while every pipe instance is busy
#[cfg(windows)]
pub async fn connect(address: &str) -> io::Result<ClientStream> {
    use std::time::Duration;
    use tokio::net::windows::named_pipe::ClientOptions;

    loop {
        match ClientOptions::new().open(address) {
            Ok(client) => return Ok(client),
            Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) => {}
            Err(e) => return Err(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[cfg(windows)]
const ERROR_PIPE_BUSY: i32 = 231;

/// Whether a server is accepting connections at `address`.
///
/// A socket file whose owner exited without removing it is not reachable.
/// Runs without a tokio runtime, so command line tools can call it directly.
#[cfg(unix)]
pub fn endpoint_reachable(address: &str) -> bool {
    std::os::unix::net::UnixStream::connect(address).is_ok()
}

/// Whether a server is accepting connections at `address`.
///
/// Opening a pipe instance counts as reachable, and so does a pipe whose
/// instances are all busy.
#[cfg(windows)]
pub fn endpoint_reachable(address: &str) -> bool {
    match std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(address)
    {
        Ok(_) => true,
        Err(e) => e.raw_os_error() == Some(ERROR_PIPE_BUSY),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ipc::listener::{IpcListener, Listener};
    use tempfile::TempDir;

    #[tokio::test]
    async fn endpoint_reachable_tracks_bound_listener() {
        let dir = TempDir::new().unwrap();
        let address = dir.path().join("host-proxy-volume-v1");
        let address = address.to_str().unwrap();

        assert!(!endpoint_reachable(address));
        let listener = IpcListener::bind(address).unwrap();
        assert!(endpoint_reachable(address));
        listener.close().unwrap();
        assert!(!endpoint_reachable(address));
    }

    #[test]
    fn endpoint_reachable_ignores_dead_socket_file() {
        let dir = TempDir::new().unwrap();
        let address = dir.path().join("host-proxy-volume-v1");
        drop(std::os::unix::net::UnixListener::bind(&address).unwrap());

        assert!(address.exists());
        assert!(!endpoint_reachable(address.to_str().unwrap()));
    }

    #[test]
    fn endpoint_reachable_ignores_plain_files() {
        let dir = TempDir::new().unwrap();
        let address = dir.path().join("host-proxy-volume-v1");
        std::fs::write(&address, b"").unwrap();

        assert!(!endpoint_reachable(address.to_str().unwrap()));
    }

    #[tokio::test]
    async fn connect_fails_without_listener() {
        let dir = TempDir::new().unwrap();
        let address = dir.path().join("host-proxy-volume-v1");

        assert!(connect(address.to_str().unwrap()).await.is_err());
    }
}
