use anyhow::anyhow;
use register::Bank;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Initial window of one bank
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankWindow {
    pub bank: Bank,
    pub start: u16,
    pub count: u8,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub history_length: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { history_length: 50 }
    }
}

/// Startup settings. The file is only ever read.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub ui: UiConfig,
    pub interval_s: Option<f64>,
    pub windows: Vec<BankWindow>,
    pub watch: Vec<Bank>,
}

impl Settings {
    /// Read settings from a JSON or, failing that, a TOML file
    pub fn read(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Unable to read settings file {}. [{}]", path, e))?;
        Self::parse(&content).map_err(|e| anyhow!("Invalid settings file {}. [{}]", path, e))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        match serde_json::from_str(content) {
            Ok(settings) => Ok(settings),
            Err(json) => toml::from_str(content)
                .map_err(|toml| anyhow!("Neither JSON ({}) nor TOML ({})", json, toml)),
        }
    }

    pub fn interval(&self) -> anyhow::Result<Option<Duration>> {
        self.interval_s
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| anyhow!("Invalid refresh interval {}. [{}]", secs, e))
            })
            .transpose()
    }
}
