use std::{future::Future, io, time::Duration};

use tokio::net::{TcpSocket, TcpStream};
use tracing::{debug, info};

use crate::{
    error::{ChatError, Result},
    resolver::{AddressFamily, Endpoint},
};

/// Walks resolved endpoints in order and keeps the first one that connects.
#[derive(Debug, Clone, Default)]
pub struct Connector {
    attempt_timeout: Option<Duration>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds every individual attempt; an elapsed attempt counts as failed.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub async fn connect(&self, endpoints: Vec<Endpoint>) -> Result<TcpStream> {
        self.connect_with(endpoints, dial_tcp).await
    }

    /// Same walk as [`Connector::connect`] with a caller-supplied dial step.
    ///
    /// Per-attempt errors are logged and dropped; only exhaustion is reported.
    pub async fn connect_with<S, D, Fut>(&self, endpoints: Vec<Endpoint>, mut dial: D) -> Result<S>
    where
        D: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        for endpoint in endpoints {
            match self.attempt(dial(endpoint)).await {
                Ok(channel) => {
                    info!(%endpoint, "connection successful");
                    return Ok(channel);
                }
                Err(error) => {
                    debug!(%endpoint, ?error, "connection attempt failed, trying next candidate");
                }
            }
        }

        Err(ChatError::Connection)
    }

    async fn attempt<S, Fut>(&self, attempt: Fut) -> io::Result<S>
    where
        Fut: Future<Output = io::Result<S>>,
    {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|elapsed| io::Error::new(io::ErrorKind::TimedOut, elapsed))?,
            None => attempt.await,
        }
    }
}

/// Opens a socket of the endpoint's family, then connects it. A socket that
/// fails to connect is dropped, which closes it.
async fn dial_tcp(endpoint: Endpoint) -> io::Result<TcpStream> {
    let socket = match endpoint.family() {
        AddressFamily::V4 => TcpSocket::new_v4()?,
        AddressFamily::V6 => TcpSocket::new_v6()?,
    };
    socket.connect(endpoint.addr()).await
}
