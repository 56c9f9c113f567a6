use derive_getters::Getters;
use itertools::Itertools;

use crate::enums::Bank;
use crate::value::RegisterValue;
use crate::window::BankConfig;

#[derive(Getters, Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    text: String,
    error: bool,
}

/// Display rows of every bank, one row per element of the applied window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueTable {
    rows: [Vec<Cell>; 4],
}

impl ValueTable {
    pub fn new(config: &BankConfig) -> Self {
        let mut table = Self::default();
        table.rebuild(config);
        table
    }

    /// Recreate the rows of every bank from the applied windows. Entered text is dropped.
    pub fn rebuild(&mut self, config: &BankConfig) {
        for bank in Bank::ALL {
            let count = *config.window(bank).count() as usize;
            self.rows[bank.index()] = vec![Cell::default(); count];
        }
    }

    pub fn rows(&self, bank: Bank) -> &[Cell] {
        &self.rows[bank.index()]
    }

    pub fn len(&self, bank: Bank) -> usize {
        self.rows[bank.index()].len()
    }

    pub fn is_empty(&self, bank: Bank) -> bool {
        self.rows[bank.index()].is_empty()
    }

    pub fn entries(&self, bank: Bank) -> Vec<String> {
        self.rows(bank).iter().map(|c| c.text.clone()).collect_vec()
    }

    /// Replace the row texts with `values`. Surplus values are ignored.
    pub fn set_values(&mut self, bank: Bank, values: &[RegisterValue]) {
        for (cell, value) in self.rows[bank.index()].iter_mut().zip(values) {
            cell.text = value.to_string();
            cell.error = false;
        }
    }

    /// Operator edit of a single row. Returns false if the row does not exist.
    pub fn set_entry(&mut self, bank: Bank, row: usize, text: impl Into<String>) -> bool {
        match self.rows[bank.index()].get_mut(row) {
            Some(cell) => {
                cell.text = text.into();
                cell.error = false;
                true
            }
            None => false,
        }
    }

    pub fn mark_error(&mut self, bank: Bank, row: usize) {
        if let Some(cell) = self.rows[bank.index()].get_mut(row) {
            cell.error = true;
        }
    }

    /// Blank every row while keeping the row count
    pub fn clear(&mut self) {
        self.rows
            .iter_mut()
            .flatten()
            .for_each(|cell| *cell = Cell::default());
    }
}
