// Crate
use crate::Error;

// Workspace
use log::Logger;
use register::{Bank, RegisterStore};

// External
use std::future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_modbus::prelude::{ExceptionCode, Response, SlaveRequest};
use tokio_modbus::server::tcp::{accept_tcp_connection, Server as TcpServer};
use tokio_modbus::{Request, SlaveId};

/// Listener bound by `Server::spawn` and the task serving it
pub struct Serving {
    pub addr: SocketAddr,
    pub task: JoinHandle<Result<(), Error>>,
}

/// Modbus request handler backed by a shared register store
#[derive(Clone)]
pub struct Server {
    store: Arc<RegisterStore>,
    log: Logger,
}

impl Server {
    pub fn new(store: Arc<RegisterStore>, log: Logger) -> Self {
        Self { store, log }
    }

    /// Bind `addr` and serve `store` on it until the returned task is aborted
    pub async fn spawn(
        addr: SocketAddr,
        store: Arc<RegisterStore>,
        log: Logger,
    ) -> Result<Serving, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        let server = TcpServer::new(listener);
        let handler = Server::new(store, log.clone());
        let task = tokio::task::spawn(async move {
            let new_request_handler = |_socket_addr| Ok(Some(handler.clone()));
            let on_connected = |stream, socket_addr| async move {
                accept_tcp_connection(stream, socket_addr, new_request_handler)
            };
            let on_process_error = move |err| {
                log.err(format!("Server processing failed. [{}]", err));
            };
            server
                .serve(&on_connected, on_process_error)
                .await
                .map_err(|e| Error::Transport(e.to_string()))
        });
        Ok(Serving { addr, task })
    }

    fn received(&self, slave: SlaveId, name: &str, addr: u16, count: usize) {
        self.log.info(format!(
            "{} request received for slave ID {} and range [{}, {})",
            name,
            slave,
            addr,
            addr as usize + count
        ));
    }

    fn handle(&self, slave: SlaveId, request: Request<'static>) -> Result<Response, ExceptionCode> {
        let result = match request {
            Request::ReadCoils(addr, cnt) => {
                self.received(slave, "ReadCoils", addr, cnt as usize);
                self.store
                    .read_bits(Bank::Coil, addr, cnt)
                    .map(Response::ReadCoils)
            }
            Request::ReadDiscreteInputs(addr, cnt) => {
                self.received(slave, "ReadDiscreteInputs", addr, cnt as usize);
                self.store
                    .read_bits(Bank::DiscreteInput, addr, cnt)
                    .map(Response::ReadDiscreteInputs)
            }
            Request::ReadHoldingRegisters(addr, cnt) => {
                self.received(slave, "ReadHoldingRegisters", addr, cnt as usize);
                self.store
                    .read_words(Bank::HoldingRegister, addr, cnt)
                    .map(Response::ReadHoldingRegisters)
            }
            Request::ReadInputRegisters(addr, cnt) => {
                self.received(slave, "ReadInputRegisters", addr, cnt as usize);
                self.store
                    .read_words(Bank::InputRegister, addr, cnt)
                    .map(Response::ReadInputRegisters)
            }
            Request::WriteSingleCoil(addr, value) => {
                self.received(slave, "WriteSingleCoil", addr, 1);
                self.store
                    .write_bits(Bank::Coil, addr, &[value])
                    .map(|_| Response::WriteSingleCoil(addr, value))
            }
            Request::WriteMultipleCoils(addr, values) => {
                self.received(slave, "WriteMultipleCoils", addr, values.len());
                self.store
                    .write_bits(Bank::Coil, addr, &values)
                    .map(|_| Response::WriteMultipleCoils(addr, values.len() as u16))
            }
            Request::WriteSingleRegister(addr, value) => {
                self.received(slave, "WriteSingleRegister", addr, 1);
                self.store
                    .write_words(Bank::HoldingRegister, addr, &[value])
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            Request::WriteMultipleRegisters(addr, values) => {
                self.received(slave, "WriteMultipleRegisters", addr, values.len());
                self.store
                    .write_words(Bank::HoldingRegister, addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            Request::ReadWriteMultipleRegisters(read_addr, cnt, write_addr, values) => {
                self.received(slave, "ReadWriteMultipleRegisters", read_addr, cnt as usize);
                self.store
                    .write_read_words(Bank::HoldingRegister, write_addr, &values, read_addr, cnt)
                    .map(Response::ReadWriteMultipleRegisters)
            }
            other => {
                self.log.err(format!(
                    "Unsupported request received for slave ID {}. [{:?}]",
                    slave, other
                ));
                return Err(ExceptionCode::IllegalFunction);
            }
        };
        result.map_err(|e| {
            self.log
                .err(format!("Request for slave ID {} rejected. [{}]", slave, e));
            match e {
                register::Error::Poisoned => ExceptionCode::ServerDeviceFailure,
                _ => ExceptionCode::IllegalDataAddress,
            }
        })
    }
}

impl tokio_modbus::server::Service for Server {
    type Request = SlaveRequest<'static>;
    type Exception = ExceptionCode;
    type Response = Response;
    type Future = future::Ready<Result<Response, ExceptionCode>>;

    fn call(&self, request: Self::Request) -> Self::Future {
        let SlaveRequest { slave, request } = request;
        future::ready(self.handle(slave, request))
    }
}
