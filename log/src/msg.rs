use chrono::Local;
use std::fmt::Display;

const TIMESTAMP_FORMAT: &str = "[ %d:%m:%Y | %H:%M:%S ]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub timestamp: String,
    pub message: String,
}

impl Message {
    fn now(message: String) -> Self {
        Self {
            timestamp: format!("{}", Local::now().format(TIMESTAMP_FORMAT)),
            message,
        }
    }
}

/// Single log line tagged with its severity
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogMsg {
    Err(Message),
    Ok(Message),
    Info(Message),
}

impl LogMsg {
    pub fn info(msg: impl Into<String>) -> LogMsg {
        Self::Info(Message::now(msg.into()))
    }

    pub fn err(msg: impl Into<String>) -> LogMsg {
        Self::Err(Message::now(msg.into()))
    }

    pub fn ok(msg: impl Into<String>) -> LogMsg {
        Self::Ok(Message::now(msg.into()))
    }

    fn inner(&self) -> &Message {
        match self {
            Self::Ok(v) | Self::Info(v) | Self::Err(v) => v,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.inner().timestamp
    }

    pub fn message(&self) -> &str {
        &self.inner().message
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }
}

impl Display for LogMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            Self::Ok(_) => "OK",
            Self::Info(_) => "INFO",
            Self::Err(_) => "ERROR",
        };
        write!(f, "{} {:<5} {}", self.timestamp(), level, self.message())
    }
}
