pub mod error;
pub mod handle;

pub use error::Error;
use handle::{ClientHandle, Handle, ServerHandle};

use log::Logger;
use net::tcp::Serving;
use net::Connection;
use register::{Bank, RegisterStore, RegisterValue, Window};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Pause between two reachability probes while a server starts up
const PROBE_RETRY: Duration = Duration::from_millis(50);

/// Probe `addr` until it accepts a connection. Gives up once `timeout` passed or `task` ended.
async fn confirm_startup(
    addr: SocketAddr,
    task: &JoinHandle<Result<(), net::Error>>,
    timeout: Duration,
) -> Result<(), Error> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if net::probe(addr, remaining).await {
            return Ok(());
        }
        if task.is_finished() || Instant::now() >= deadline {
            return Err(Error::StartupTimeout {
                addr,
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        sleep(PROBE_RETRY).await;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Client,
    Server,
}

impl Role {
    /// Refresh interval used when the operator did not choose one
    pub fn default_interval(&self) -> Duration {
        match self {
            Self::Client => Duration::ZERO,
            Self::Server => Duration::from_secs(2),
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "Client"),
            Self::Server => write!(f, "Server"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Active,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// What an active session reads from and writes to
pub enum Target<'a> {
    Remote(&'a mut dyn Connection),
    Store(&'a RegisterStore),
}

impl Target<'_> {
    pub async fn read(
        &mut self,
        bank: Bank,
        window: &Window,
    ) -> Result<Vec<RegisterValue>, net::Error> {
        match self {
            Target::Remote(connection) => {
                connection
                    .read(bank, *window.start(), *window.count() as u16)
                    .await
            }
            Target::Store(store) => {
                Ok(store.read(bank, *window.start(), *window.count() as usize)?)
            }
        }
    }

    pub async fn write(
        &mut self,
        bank: Bank,
        offset: u16,
        values: &[RegisterValue],
    ) -> Result<(), net::Error> {
        match self {
            Target::Remote(connection) => connection.write(bank, offset, values).await,
            Target::Store(store) => Ok(store.write(bank, offset, values)?),
        }
    }
}

/// Single client connection or server listener. At most one is active at a time.
pub struct Instance {
    role: Role,
    handle: Option<Handle>,
    failed: bool,
    log: Logger,
}

impl Instance {
    pub fn new(role: Role, log: Logger) -> Self {
        Self {
            role,
            handle: None,
            failed: false,
            log,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> Status {
        if self.handle.is_some() {
            Status::Active
        } else {
            Status::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn ensure_idle(&self) -> Result<(), Error> {
        match self.status() {
            Status::Idle => Ok(()),
            status => Err(Error::InvalidState(status)),
        }
    }

    /// The role is locked while a session is active
    pub fn set_role(&mut self, role: Role) -> Result<(), Error> {
        self.ensure_idle()?;
        if self.role != role {
            self.role = role;
            self.failed = false;
        }
        Ok(())
    }

    pub fn status_text(&self) -> &'static str {
        match (&self.handle, self.role, self.failed) {
            (Some(Handle::Client(_)), _, _) => "● Connected",
            (Some(Handle::Server(_)), _, _) => "● Server Running",
            (None, Role::Client, true) => "● Failed",
            (None, Role::Server, true) => "● Server Failed",
            (None, _, false) => "● Disconnected",
        }
    }

    /// Store served in server role
    pub fn store(&self) -> Option<Arc<RegisterStore>> {
        match &self.handle {
            Some(Handle::Server(h)) => Some(h.store.clone()),
            _ => None,
        }
    }

    /// Address the server is actually listening on
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.handle {
            Some(Handle::Server(h)) => Some(h.addr),
            _ => None,
        }
    }

    pub fn target(&mut self) -> Option<Target<'_>> {
        match self.handle.as_mut()? {
            Handle::Client(h) => Some(Target::Remote(h.connection.as_mut())),
            Handle::Server(h) => Some(Target::Store(&h.store)),
        }
    }

    pub async fn start(&mut self, endpoint: &net::Config) -> Result<(), Error> {
        self.ensure_idle()?;
        let result = match self.role {
            Role::Client => self.start_client(endpoint).await,
            Role::Server => self.start_server(endpoint).await,
        };
        self.settle(result)
    }

    /// Remember and log a failed start
    fn settle(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        self.failed = result.is_err();
        if let Err(e) = &result {
            self.log.err(e.to_string());
        }
        result
    }

    async fn start_client(&mut self, endpoint: &net::Config) -> Result<(), Error> {
        let client = net::Client::connect(endpoint)
            .await
            .map_err(Error::Connect)?;
        let peer = client.addr().to_string();
        self.attach(Box::new(client), peer)
    }

    async fn start_server(&mut self, endpoint: &net::Config) -> Result<(), Error> {
        let addr = endpoint.socket_addr().map_err(Error::Bind)?;
        let store = Arc::new(RegisterStore::new());
        let serving = net::Server::spawn(addr, store.clone(), self.log.clone())
            .await
            .map_err(Error::Bind)?;
        self.serve(serving, store, endpoint.timeout()).await
    }

    /// Take over a spawned server once it answers on its address. The task is aborted otherwise.
    async fn serve(
        &mut self,
        serving: Serving,
        store: Arc<RegisterStore>,
        timeout: Duration,
    ) -> Result<(), Error> {
        let Serving { addr, task } = serving;
        if let Err(e) = confirm_startup(addr, &task, timeout).await {
            task.abort();
            let _ = task.await;
            return Err(e);
        }

        self.log.ok(format!("Server running on {}.", addr));
        self.handle = Some(Handle::Server(ServerHandle { task, store, addr }));
        Ok(())
    }

    /// Activate a client session over an already established connection
    pub fn attach(
        &mut self,
        connection: Box<dyn Connection>,
        peer: impl Into<String>,
    ) -> Result<(), Error> {
        self.ensure_idle()?;
        self.role = Role::Client;
        self.failed = false;
        let peer = peer.into();
        self.log.ok(format!("Connected to {}.", peer));
        self.handle = Some(Handle::Client(ClientHandle { connection, peer }));
        Ok(())
    }

    /// Close the connection or listener. Does nothing while idle.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle {
            Handle::Client(mut h) => {
                h.connection.close().await;
                self.log.info(format!("Disconnected from {}.", h.peer));
            }
            Handle::Server(h) => {
                h.task.abort();
                if let Ok(Err(e)) = h.task.await {
                    self.log
                        .err(format!("Server on {} terminated. [{}]", h.addr, e));
                }
                self.log.info(format!("Server on {} stopped.", h.addr));
            }
        }
        self.failed = false;
    }
}
