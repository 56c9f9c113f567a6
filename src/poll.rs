use crate::instance::Instance;

use log::Logger;
use register::{Bank, BankConfig, RegisterValue, ValueTable, WatchGate};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Result of one refresh cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tick {
    pub delivered: Vec<(Bank, Vec<RegisterValue>)>,
    pub failed: Vec<Bank>,
}

impl Tick {
    pub fn values(&self, bank: Bank) -> Option<&[RegisterValue]> {
        self.delivered
            .iter()
            .find(|(b, _)| *b == bank)
            .map(|(_, v)| v.as_slice())
    }
}

/// Refresh schedule. Without an interval the loop only runs on manual refresh.
#[derive(Debug, Clone, Default)]
pub struct PollLoop {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl PollLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: (!interval.is_zero()).then_some(interval),
            next: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = (!interval.is_zero()).then_some(interval);
        if self.interval.is_none() {
            self.next = None;
        }
    }

    /// Schedule the next tick one interval after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next = self.interval.map(|i| now + i);
    }

    pub fn disarm(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next.is_some_and(|next| now >= next)
    }

    /// Sleep until the next tick is due. Never completes while dormant.
    pub async fn wait(&self) {
        match self.next {
            Some(next) => sleep_until(next).await,
            None => std::future::pending().await,
        }
    }

    /// Read every watched bank, deliver the values into `table` and reschedule.
    ///
    /// Returns `None` and stays dormant once the session is no longer active. A failing bank is
    /// logged and does not keep the remaining banks from being read.
    pub async fn tick(
        &mut self,
        instance: &mut Instance,
        config: &BankConfig,
        watch: &WatchGate,
        table: &mut ValueTable,
        log: &Logger,
    ) -> Option<Tick> {
        let Some(mut target) = instance.target() else {
            self.disarm();
            return None;
        };

        let mut tick = Tick::default();
        for bank in watch.watched() {
            let window = config.window(bank);
            match target.read(bank, window).await {
                Ok(values) => {
                    table.set_values(bank, &values);
                    tick.delivered.push((bank, values));
                }
                Err(e) => {
                    log.err(format!("Read of {} {} failed. [{}]", bank, window.range(), e));
                    tick.failed.push(bank);
                }
            }
        }
        if !tick.delivered.is_empty() {
            log.info("Registers refreshed.");
        }

        self.arm(Instant::now());
        Some(tick)
    }
}
