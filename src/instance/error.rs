use std::net::SocketAddr;
use thiserror::Error;

use super::Status;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Operation not allowed while the session is {0}")]
    InvalidState(Status),
    #[error("Client start failed. {0}")]
    Connect(#[source] net::Error),
    #[error("Server start failed. {0}")]
    Bind(#[source] net::Error),
    #[error("Invalid endpoint. {0}")]
    Endpoint(#[source] net::Error),
    #[error("Server on {addr} not reachable within {timeout_ms} ms")]
    StartupTimeout { addr: SocketAddr, timeout_ms: u64 },
    #[error(transparent)]
    Register(#[from] register::Error),
}
