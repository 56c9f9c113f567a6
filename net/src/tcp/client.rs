use crate::tcp::Config;
use crate::Error;

use async_trait::async_trait;
use register::{Bank, RegisterValue};
use std::fmt::Display;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::{Client as ModbusClient, ExceptionCode, Reader, Writer};
use tokio_modbus::FunctionCode;

/// Remote device as seen by polling and writing
#[async_trait]
pub trait Connection: Send {
    async fn read(
        &mut self,
        bank: Bank,
        offset: u16,
        count: u16,
    ) -> Result<Vec<RegisterValue>, Error>;

    async fn write(
        &mut self,
        bank: Bank,
        offset: u16,
        values: &[RegisterValue],
    ) -> Result<(), Error>;

    async fn close(&mut self);
}

/// Modbus TCP client. Every operation is bounded by the configured timeout.
pub struct Client {
    context: Context,
    addr: SocketAddr,
    timeout: Duration,
}

impl Client {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let addr = config.socket_addr()?;
        let timeout = config.timeout();
        match tokio::time::timeout(timeout, tokio_modbus::client::tcp::connect(addr)).await {
            Ok(Ok(context)) => Ok(Self {
                context,
                addr,
                timeout,
            }),
            Ok(Err(e)) => Err(Error::Connect {
                addr,
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Connect {
                addr,
                reason: format!("no answer within {} ms", config.timeout_ms),
            }),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn settle<T, E: Display>(
        &self,
        code: FunctionCode,
        result: Result<Result<Result<T, ExceptionCode>, E>, Elapsed>,
    ) -> Result<T, Error> {
        match result {
            Ok(Ok(Ok(v))) => Ok(v),
            Ok(Ok(Err(exception))) => Err(Error::Remote { code, exception }),
            Ok(Err(e)) => Err(Error::Transport(e.to_string())),
            Err(_) => Err(Error::TimedOut(self.timeout.as_millis() as u64)),
        }
    }
}

fn bits(bank: Bank, values: &[RegisterValue]) -> Result<Vec<bool>, Error> {
    values
        .iter()
        .map(|v| match v {
            RegisterValue::Bit(b) => Ok(*b),
            RegisterValue::Word(_) => Err(Error::from(register::Error::Mismatch {
                bank,
                found: "word",
            })),
        })
        .collect()
}

fn words(bank: Bank, values: &[RegisterValue]) -> Result<Vec<u16>, Error> {
    values
        .iter()
        .map(|v| match v {
            RegisterValue::Word(w) => Ok(*w),
            RegisterValue::Bit(_) => Err(Error::from(register::Error::Mismatch {
                bank,
                found: "bit",
            })),
        })
        .collect()
}

#[async_trait]
impl Connection for Client {
    async fn read(
        &mut self,
        bank: Bank,
        offset: u16,
        count: u16,
    ) -> Result<Vec<RegisterValue>, Error> {
        let timeout = self.timeout;
        let code = bank.read_code();
        let raw: Vec<u16> = match bank {
            Bank::Coil => {
                let request = self.context.read_coils(offset, count);
                let result = tokio::time::timeout(timeout, request).await;
                self.settle(code, result)?
                    .into_iter()
                    .map(|b| b as u16)
                    .collect()
            }
            Bank::DiscreteInput => {
                let request = self.context.read_discrete_inputs(offset, count);
                let result = tokio::time::timeout(timeout, request).await;
                self.settle(code, result)?
                    .into_iter()
                    .map(|b| b as u16)
                    .collect()
            }
            Bank::HoldingRegister => {
                let request = self.context.read_holding_registers(offset, count);
                let result = tokio::time::timeout(timeout, request).await;
                self.settle(code, result)?
            }
            Bank::InputRegister => {
                let request = self.context.read_input_registers(offset, count);
                let result = tokio::time::timeout(timeout, request).await;
                self.settle(code, result)?
            }
        };
        Ok(raw
            .into_iter()
            .take(count as usize)
            .map(|v| RegisterValue::from_raw(bank, v))
            .collect())
    }

    async fn write(
        &mut self,
        bank: Bank,
        offset: u16,
        values: &[RegisterValue],
    ) -> Result<(), Error> {
        let Some(code) = bank.write_code() else {
            return Err(Error::ReadOnly(bank));
        };
        let timeout = self.timeout;
        if bank.is_bit() {
            let coils = bits(bank, values)?;
            let request = self.context.write_multiple_coils(offset, &coils);
            let result = tokio::time::timeout(timeout, request).await;
            self.settle(code, result)
        } else {
            let registers = words(bank, values)?;
            let request = self.context.write_multiple_registers(offset, &registers);
            let result = tokio::time::timeout(timeout, request).await;
            self.settle(code, result)
        }
    }

    async fn close(&mut self) {
        let _ = tokio::time::timeout(self.timeout, self.context.disconnect()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{bits, words, Client, Connection};
    use crate::tcp::{Config, Server};
    use crate::Error;
    use log::Logger;
    use register::{Bank, RegisterStore, RegisterValue};
    use std::sync::Arc;
    use tokio_modbus::prelude::ExceptionCode;
    use tokio_modbus::FunctionCode;

    #[test]
    fn ut_client_value_conversion() {
        let values = [RegisterValue::Bit(true), RegisterValue::Bit(false)];
        assert_eq!(bits(Bank::Coil, &values).unwrap(), vec![true, false]);
        assert!(matches!(
            words(Bank::HoldingRegister, &values),
            Err(Error::Register(register::Error::Mismatch { .. }))
        ));

        let values = [RegisterValue::Word(7)];
        assert_eq!(words(Bank::HoldingRegister, &values).unwrap(), vec![7]);
        assert!(bits(Bank::Coil, &values).is_err());
    }

    #[tokio::test]
    async fn ut_client_errors_name_the_bank() {
        let store = Arc::new(RegisterStore::new());
        let addr = "127.0.0.1:0".parse().unwrap();
        let serving = Server::spawn(addr, store, Logger::default()).await.unwrap();

        let config = Config {
            ip: "127.0.0.1".to_owned(),
            port: serving.addr.port(),
            timeout_ms: 1000,
        };
        let mut client = Client::connect(&config).await.unwrap();

        let err = client
            .read(Bank::HoldingRegister, 95, 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Remote {
                code: FunctionCode::ReadHoldingRegisters,
                exception: ExceptionCode::IllegalDataAddress,
            }
        ));

        let values = [RegisterValue::Bit(true)];
        for bank in [Bank::DiscreteInput, Bank::InputRegister] {
            let err = client.write(bank, 0, &values).await.unwrap_err();
            assert!(matches!(err, Error::ReadOnly(b) if b == bank));
        }
        client.write(Bank::Coil, 3, &values).await.unwrap();
        assert_eq!(
            client.read(Bank::Coil, 2, 2).await.unwrap(),
            vec![RegisterValue::Bit(false), RegisterValue::Bit(true)]
        );

        client.close().await;
        serving.task.abort();
    }
}
