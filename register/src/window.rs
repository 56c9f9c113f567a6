use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::enums::Bank;
use crate::error::Error;
use memory::Range;

pub const MAX_START: u16 = 9999;
pub const MAX_COUNT: u8 = 10;

/// Sub range of a bank that is displayed and synchronized
#[derive(Getters, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: u16,
    count: u8,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            start: 0,
            count: MAX_COUNT,
        }
    }
}

impl Window {
    pub fn new(bank: Bank, start: u16, count: u8) -> Result<Self, Error> {
        if start > MAX_START {
            return Err(Error::InvalidStart { bank, start });
        }
        if count == 0 || count > MAX_COUNT {
            return Err(Error::InvalidCount { bank, count });
        }
        Ok(Self { start, count })
    }

    pub fn range(&self) -> Range {
        Range::new(self.start as usize, self.count as usize)
    }

    /// Offsets covered by this window
    pub fn offsets(&self) -> impl Iterator<Item = u16> {
        let start = self.start;
        (0..self.count as u16).map(move |i| start + i)
    }
}

/// Per bank windows. Changes are staged with `set` and only become visible through `apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankConfig {
    pending: [Window; 4],
    applied: [Window; 4],
}

impl BankConfig {
    /// Stage a new window for `bank`. Invalid input keeps the previous window.
    pub fn set(&mut self, bank: Bank, start: u16, count: u8) -> Result<(), Error> {
        self.pending[bank.index()] = Window::new(bank, start, count)?;
        Ok(())
    }

    pub fn pending(&self, bank: Bank) -> &Window {
        &self.pending[bank.index()]
    }

    pub fn window(&self, bank: Bank) -> &Window {
        &self.applied[bank.index()]
    }

    pub fn is_dirty(&self) -> bool {
        self.pending != self.applied
    }

    /// Make the staged windows visible. Returns whether anything changed.
    pub fn apply(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.applied = self.pending;
        true
    }
}
