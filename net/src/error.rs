use std::net::SocketAddr;
use thiserror::Error;
use tokio_modbus::prelude::ExceptionCode;
use tokio_modbus::FunctionCode;

use register::Bank;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid address '{0}'")]
    Address(String),
    #[error("Connection to {addr} failed. [{reason}]")]
    Connect { addr: SocketAddr, reason: String },
    #[error("Unable to bind {addr}. [{source}]")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Remote device answered {code:?} with exception {exception:?}")]
    Remote {
        code: FunctionCode,
        exception: ExceptionCode,
    },
    #[error("Transport failure. [{0}]")]
    Transport(String),
    #[error("No response within {0} ms")]
    TimedOut(u64),
    #[error("{0} are read-only for a Modbus client")]
    ReadOnly(Bank),
    #[error(transparent)]
    Register(#[from] register::Error),
}
