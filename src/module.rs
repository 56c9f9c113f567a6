use crate::config::Settings;
use crate::instance::{Error, Instance, Role};
use crate::poll::{PollLoop, Tick};
use crate::write::{self, Report};

use log::Logger;
use register::{Bank, BankConfig, ValueTable, WatchGate};
use std::time::Duration;
use tokio::time::Instant;

/// Session plus everything the operator configures around it
pub struct Module {
    instance: Instance,
    config: BankConfig,
    watch: WatchGate,
    table: ValueTable,
    poll: PollLoop,
    endpoint: net::Config,
    interval: Option<Duration>,
    log: Logger,
}

impl Module {
    /// `interval` overrides the role dependent default refresh interval
    pub fn new(
        role: Role,
        endpoint: net::Config,
        interval: Option<Duration>,
        log: Logger,
    ) -> Self {
        let config = BankConfig::default();
        let table = ValueTable::new(&config);
        Self {
            instance: Instance::new(role, log.clone()),
            poll: PollLoop::new(interval.unwrap_or(role.default_interval())),
            config,
            watch: WatchGate::default(),
            table,
            endpoint,
            interval,
            log,
        }
    }

    /// Seed windows and watch flags from a settings file
    pub fn load(&mut self, settings: &Settings) -> Result<(), Error> {
        for window in settings.windows.iter() {
            self.set_window(window.bank, window.start, window.count)?;
        }
        self.apply()?;
        for bank in settings.watch.iter() {
            self.watch.set(*bank, true);
        }
        Ok(())
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn watch(&self) -> &WatchGate {
        &self.watch
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn poll(&self) -> &PollLoop {
        &self.poll
    }

    pub fn endpoint(&self) -> &net::Config {
        &self.endpoint
    }

    /// Open the session. A server shows its watched banks right away.
    pub async fn start(&mut self) -> Result<(), Error> {
        self.instance.start(&self.endpoint).await?;
        self.poll.arm(Instant::now());
        if self.instance.role() == Role::Server {
            self.refresh().await;
        }
        Ok(())
    }

    /// Start a client session over an existing connection
    #[cfg(test)]
    pub fn attach(
        &mut self,
        connection: Box<dyn net::Connection>,
        peer: &str,
    ) -> Result<(), Error> {
        self.instance.attach(connection, peer)?;
        self.poll.arm(Instant::now());
        Ok(())
    }

    pub async fn stop(&mut self) {
        self.instance.stop().await;
        self.poll.disarm();
        self.table.clear();
    }

    /// Run a tick right away, regardless of the schedule
    pub async fn refresh(&mut self) -> Option<Tick> {
        self.poll
            .tick(
                &mut self.instance,
                &self.config,
                &self.watch,
                &mut self.table,
                &self.log,
            )
            .await
    }

    /// Run a tick if the schedule says so
    pub async fn tick_if_due(&mut self) -> Option<Tick> {
        if self.poll.is_due(Instant::now()) {
            self.refresh().await
        } else {
            None
        }
    }

    pub async fn write(&mut self) -> Result<Report, Error> {
        write::write(
            &mut self.instance,
            &self.config,
            &self.watch,
            &mut self.table,
            &self.log,
        )
        .await
    }

    pub fn set_role(&mut self, role: Role) -> Result<(), Error> {
        self.instance.set_role(role)?;
        self.poll
            .set_interval(self.interval.unwrap_or(role.default_interval()));
        Ok(())
    }

    /// Host the next session connects to or listens on
    pub fn set_ip(&mut self, ip: &str) -> Result<(), Error> {
        self.instance.ensure_idle()?;
        let endpoint = net::Config {
            ip: ip.trim().to_owned(),
            ..self.endpoint.clone()
        };
        endpoint.socket_addr().map_err(Error::Endpoint)?;
        self.endpoint = endpoint;
        Ok(())
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), Error> {
        self.instance.ensure_idle()?;
        self.endpoint.port = port;
        Ok(())
    }

    /// `None` falls back to the default interval of the role
    pub fn set_interval(&mut self, interval: Option<Duration>) -> Result<(), Error> {
        self.instance.ensure_idle()?;
        self.interval = interval;
        self.poll
            .set_interval(interval.unwrap_or(self.instance.role().default_interval()));
        Ok(())
    }

    pub fn set_window(&mut self, bank: Bank, start: u16, count: u8) -> Result<(), Error> {
        self.instance.ensure_idle()?;
        self.config.set(bank, start, count)?;
        Ok(())
    }

    /// Make staged windows visible and rebuild the display rows
    pub fn apply(&mut self) -> Result<bool, Error> {
        self.instance.ensure_idle()?;
        if !self.config.apply() {
            return Ok(false);
        }
        self.table.rebuild(&self.config);
        Ok(true)
    }

    /// Shift start and count of the window of `bank` and apply the result
    pub fn adjust_window(
        &mut self,
        bank: Bank,
        start_delta: i32,
        count_delta: i32,
    ) -> Result<(), Error> {
        let window = self.config.window(bank);
        let start = (*window.start() as i32 + start_delta).clamp(0, u16::MAX as i32) as u16;
        let count = (*window.count() as i32 + count_delta).clamp(0, u8::MAX as i32) as u8;
        self.set_window(bank, start, count)?;
        self.apply()?;
        Ok(())
    }

    pub fn toggle_watch(&mut self, bank: Bank) -> bool {
        self.watch.toggle(bank)
    }

    pub fn set_watch(&mut self, bank: Bank, watched: bool) {
        self.watch.set(bank, watched);
    }

    pub fn edit(&mut self, bank: Bank, row: usize, text: impl Into<String>) -> bool {
        self.table.set_entry(bank, row, text)
    }
}
