use std::{fmt, net::SocketAddr};

use tokio::net::lookup_host;
use tracing::debug;

use crate::error::{ChatError, Result};

const SERVICES_DATABASE: &str = "/etc/services";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// One resolved candidate for a stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    addr: SocketAddr,
}

impl Endpoint {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn family(&self) -> AddressFamily {
        match self.addr {
            SocketAddr::V4(_) => AddressFamily::V4,
            SocketAddr::V6(_) => AddressFamily::V6,
        }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr.fmt(f)
    }
}

/// Resolves `host` and `port` into every stream endpoint the system offers,
/// IPv4 and IPv6 alike, in resolver order.
///
/// `port` is either a number or a service name from the system services
/// database. Nothing is retried: the first failure is returned to the caller.
pub async fn resolve(host: &str, port: &str) -> Result<Vec<Endpoint>> {
    let target = format!("{host}:{port}");
    let resolution_error = |cause: String| ChatError::Resolution {
        target: target.clone(),
        cause,
    };

    let port = resolve_port(port).await.map_err(resolution_error)?;
    let endpoints: Vec<Endpoint> = lookup_host((host, port))
        .await
        .map_err(|err| resolution_error(err.to_string()))?
        .map(Endpoint::from)
        .collect();

    if endpoints.is_empty() {
        return Err(resolution_error("no addresses found".to_string()));
    }

    debug!(%target, count = endpoints.len(), "resolved endpoints");
    Ok(endpoints)
}

async fn resolve_port(port: &str) -> std::result::Result<u16, String> {
    if let Ok(number) = port.parse::<u16>() {
        return Ok(number);
    }

    let database = tokio::fs::read_to_string(SERVICES_DATABASE)
        .await
        .map_err(|err| format!("unknown service '{port}' ({SERVICES_DATABASE}: {err})"))?;
    lookup_service(&database, port).ok_or_else(|| format!("unknown service '{port}'"))
}

/// Finds the tcp port of `name` in `/etc/services` syntax, matching aliases too.
fn lookup_service(database: &str, name: &str) -> Option<u16> {
    database.lines().find_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let service = fields.next()?;
        let (port, protocol) = fields.next()?.split_once('/')?;
        if protocol != "tcp" {
            return None;
        }
        let mut aliases = fields;
        if service == name || aliases.any(|alias| alias == name) {
            port.parse().ok()
        } else {
            None
        }
    })
}
