mod client;
mod probe;
mod server;

use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::Error;

pub use client::{Client, Connection};
pub use probe::{probe, probe_target};
pub use server::{Server, Serving};

#[derive(Serialize, Deserialize, Clone, Debug, Args, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// The interface to use for the service or the ip to connect to in client mode.
    #[arg(short, long, default_value_t = String::from("127.0.0.1"))]
    pub ip: String,

    /// The port to use for the service or the port to connect to on target host.
    #[arg(short, long, default_value_t = 502)]
    pub port: u16,

    /// The timeout in milliseconds for connect, startup probe and each Modbus operation
    #[arg(id = "timeout", short = 't', long = "timeout", default_value_t = 2000)]
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: String::from("127.0.0.1"),
            port: 502,
            timeout_ms: 2000,
        }
    }
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        let ip: IpAddr = self
            .ip
            .trim()
            .parse()
            .map_err(|_| Error::Address(format!("{}:{}", self.ip, self.port)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
