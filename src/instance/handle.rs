use net::Connection;
use register::RegisterStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct ClientHandle {
    pub connection: Box<dyn Connection>,
    pub peer: String,
}

pub struct ServerHandle {
    pub task: JoinHandle<Result<(), net::Error>>,
    pub store: Arc<RegisterStore>,
    pub addr: SocketAddr,
}

pub enum Handle {
    Server(ServerHandle),
    Client(ClientHandle),
}
