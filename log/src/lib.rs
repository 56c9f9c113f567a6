mod msg;

pub use msg::{LogMsg, Message};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Bounded log history. The oldest message is dropped once `LOG_SIZE` messages are buffered.
#[derive(Debug)]
pub struct Log<const LOG_SIZE: usize> {
    buffer: VecDeque<LogMsg>,
}

impl<const LOG_SIZE: usize> Default for Log<LOG_SIZE> {
    fn default() -> Self {
        Self {
            buffer: VecDeque::with_capacity(LOG_SIZE),
        }
    }
}

impl<const LOG_SIZE: usize> Log<LOG_SIZE> {
    pub fn write(&mut self, msg: LogMsg) {
        if LOG_SIZE == 0 {
            return;
        }
        if self.buffer.len() == LOG_SIZE {
            self.buffer.pop_front();
        }
        self.buffer.push_back(msg);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn take_n(&mut self, cnt: usize) -> Vec<LogMsg> {
        let cnt = cnt.min(self.buffer.len());
        self.buffer.drain(..cnt).collect()
    }
}

pub const LOG_SIZE: usize = 256;

/// Cloneable handle that every component writes its log lines through
#[derive(Debug, Clone, Default)]
pub struct Logger {
    inner: Arc<Mutex<Log<LOG_SIZE>>>,
}

impl Logger {
    pub fn write(&self, msg: LogMsg) {
        // A poisoned log still holds valid messages
        let mut log = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        log.write(msg);
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.write(LogMsg::info(msg));
    }

    pub fn ok(&self, msg: impl Into<String>) {
        self.write(LogMsg::ok(msg));
    }

    pub fn err(&self, msg: impl Into<String>) {
        self.write(LogMsg::err(msg));
    }

    /// Remove and return every buffered message, oldest first
    pub fn drain(&self) -> Vec<LogMsg> {
        let mut log = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let len = log.len();
        log.take_n(len)
    }
}

#[cfg(test)]
mod tests {
    use super::{Log, LogMsg, Logger};

    #[test]
    fn ut_log() {
        let mut log: Log<5> = Log::default();
        assert!(log.is_empty());

        for i in 1..=4 {
            log.write(LogMsg::ok(format!("message {}", i)));
        }
        assert_eq!(log.len(), 4);
        assert_eq!(log.take_n(3).len(), 3);

        let rest = log.take_n(3);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].message(), "message 4");
        assert!(log.take_n(3).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn ut_log_drops_oldest() {
        let mut log: Log<3> = Log::default();
        for i in 0..5 {
            log.write(LogMsg::info(format!("{}", i)));
        }
        let msgs: Vec<String> = log.take_n(10).iter().map(|m| m.message().to_owned()).collect();
        assert_eq!(msgs, vec!["2", "3", "4"]);
    }

    #[test]
    fn ut_logger_shared() {
        let logger = Logger::default();
        let other = logger.clone();
        logger.info("server started");
        other.err("bind failed");

        let msgs = logger.drain();
        assert_eq!(msgs.len(), 2);
        assert!(!msgs[0].is_err());
        assert!(msgs[1].is_err());
        assert!(other.drain().is_empty());
    }

    #[test]
    fn ut_log_msg_display() {
        let msg = LogMsg::ok("Wrote 3 values");
        let line = msg.to_string();
        assert!(line.starts_with(msg.timestamp()));
        assert!(line.ends_with("OK    Wrote 3 values"));
    }
}
