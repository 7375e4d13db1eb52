//! TCP reachability probe

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Check whether `host:port` accepts TCP connections within `probe_timeout`.
///
/// An unconfigured port (`None`) is vacuously reachable. No retries here;
/// the next scheduler cycle is the retry.
pub async fn probe_port(host: &str, port: Option<u16>, probe_timeout: Duration) -> bool {
    let Some(port) = port else {
        return true;
    };

    match timeout(probe_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!("Port {}:{} closed: {}", host, port, e);
            false
        }
        Err(_) => {
            debug!(
                "Port {}:{} probe timed out after {:?}",
                host, port, probe_timeout
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_unconfigured_port_is_reachable() {
        assert!(probe_port("127.0.0.1", None, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(probe_port("127.0.0.1", Some(port), TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!probe_port("127.0.0.1", Some(port), TIMEOUT).await);
    }
}
