use std::sync::RwLock;

use crate::enums::Bank;
use crate::error::Error;
use crate::value::RegisterValue;
use memory::{Memory, Range};

/// Number of elements served per bank
pub const CAPACITY: usize = 100;

/// Register map served in server role. Every read and write holds the lock for the whole batch.
#[derive(Debug)]
pub struct RegisterStore {
    memory: RwLock<Memory<Bank>>,
    capacity: usize,
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::with_capacity(CAPACITY)
    }
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut memory = Memory::default();
        for bank in Bank::ALL {
            memory.add_area(bank, Range::new(0, capacity));
        }
        Self {
            memory: RwLock::new(memory),
            capacity,
        }
    }

    fn range(&self, bank: Bank, offset: u16, count: usize) -> Result<Range, Error> {
        let range = Range::new(offset as usize, count);
        if range.end > self.capacity {
            return Err(Error::OutOfRange {
                bank,
                offset: range.start,
                end: range.end,
                capacity: self.capacity,
            });
        }
        Ok(range)
    }

    fn read_raw(&self, bank: Bank, offset: u16, count: usize) -> Result<Vec<u16>, Error> {
        let range = self.range(bank, offset, count)?;
        let memory = self.memory.read().map_err(|_| Error::Poisoned)?;
        Ok(memory.read(&bank, &range)?)
    }

    fn write_raw(&self, bank: Bank, offset: u16, values: &[u16]) -> Result<(), Error> {
        let range = self.range(bank, offset, values.len())?;
        let mut memory = self.memory.write().map_err(|_| Error::Poisoned)?;
        Ok(memory.write(&bank, &range, values)?)
    }

    pub fn read(&self, bank: Bank, offset: u16, count: usize) -> Result<Vec<RegisterValue>, Error> {
        Ok(self
            .read_raw(bank, offset, count)?
            .into_iter()
            .map(|raw| RegisterValue::from_raw(bank, raw))
            .collect())
    }

    /// Write `values` as one batch. Values of the wrong kind for `bank` reject the whole batch.
    pub fn write(&self, bank: Bank, offset: u16, values: &[RegisterValue]) -> Result<(), Error> {
        if let Some(value) = values.iter().find(|v| !v.fits(bank)) {
            return Err(Error::Mismatch {
                bank,
                found: value.kind(),
            });
        }
        let raw: Vec<u16> = values.iter().map(RegisterValue::raw).collect();
        self.write_raw(bank, offset, &raw)
    }

    fn expect_bits(bank: Bank) -> Result<(), Error> {
        if bank.is_bit() {
            Ok(())
        } else {
            Err(Error::Mismatch { bank, found: "bit" })
        }
    }

    fn expect_words(bank: Bank) -> Result<(), Error> {
        if bank.is_bit() {
            Err(Error::Mismatch { bank, found: "word" })
        } else {
            Ok(())
        }
    }

    pub fn read_bits(&self, bank: Bank, offset: u16, count: u16) -> Result<Vec<bool>, Error> {
        Self::expect_bits(bank)?;
        Ok(self
            .read_raw(bank, offset, count as usize)?
            .into_iter()
            .map(|v| v != 0)
            .collect())
    }

    pub fn read_words(&self, bank: Bank, offset: u16, count: u16) -> Result<Vec<u16>, Error> {
        Self::expect_words(bank)?;
        self.read_raw(bank, offset, count as usize)
    }

    pub fn write_bits(&self, bank: Bank, offset: u16, values: &[bool]) -> Result<(), Error> {
        Self::expect_bits(bank)?;
        let raw: Vec<u16> = values.iter().map(|v| *v as u16).collect();
        self.write_raw(bank, offset, &raw)
    }

    pub fn write_words(&self, bank: Bank, offset: u16, values: &[u16]) -> Result<(), Error> {
        Self::expect_words(bank)?;
        self.write_raw(bank, offset, values)
    }

    /// Write `values` at `write_offset` and read `count` words at `read_offset` under one lock
    pub fn write_read_words(
        &self,
        bank: Bank,
        write_offset: u16,
        values: &[u16],
        read_offset: u16,
        count: u16,
    ) -> Result<Vec<u16>, Error> {
        Self::expect_words(bank)?;
        let write_range = self.range(bank, write_offset, values.len())?;
        let read_range = self.range(bank, read_offset, count as usize)?;
        let mut memory = self.memory.write().map_err(|_| Error::Poisoned)?;
        memory.write(&bank, &write_range, values)?;
        Ok(memory.read(&bank, &read_range)?)
    }
}
