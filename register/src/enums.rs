use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tokio_modbus::FunctionCode;

use crate::error::Error;

/// The four independently addressed Modbus data banks
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Bank {
    Coil,
    DiscreteInput,
    HoldingRegister,
    InputRegister,
}

impl Bank {
    /// Every bank in processing order
    pub const ALL: [Bank; 4] = [
        Bank::Coil,
        Bank::DiscreteInput,
        Bank::HoldingRegister,
        Bank::InputRegister,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Coil => 0,
            Self::DiscreteInput => 1,
            Self::HoldingRegister => 2,
            Self::InputRegister => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Coil => "Coils",
            Self::DiscreteInput => "Discrete Inputs",
            Self::HoldingRegister => "Holding Registers",
            Self::InputRegister => "Input Registers",
        }
    }

    /// Coils and discrete inputs hold single bits, the register banks 16-bit words
    pub fn is_bit(&self) -> bool {
        matches!(self, Self::Coil | Self::DiscreteInput)
    }

    pub fn read_code(&self) -> FunctionCode {
        match self {
            Self::Coil => FunctionCode::ReadCoils,
            Self::DiscreteInput => FunctionCode::ReadDiscreteInputs,
            Self::HoldingRegister => FunctionCode::ReadHoldingRegisters,
            Self::InputRegister => FunctionCode::ReadInputRegisters,
        }
    }

    /// Function code a Modbus client writes this bank with. `None` for the read-only banks.
    pub fn write_code(&self) -> Option<FunctionCode> {
        match self {
            Self::Coil => Some(FunctionCode::WriteMultipleCoils),
            Self::HoldingRegister => Some(FunctionCode::WriteMultipleRegisters),
            Self::DiscreteInput | Self::InputRegister => None,
        }
    }
}

impl Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Bank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "co" | "coil" | "coils" => Ok(Self::Coil),
            "di" | "discrete_input" | "discrete_inputs" => Ok(Self::DiscreteInput),
            "hr" | "holding_register" | "holding_registers" => Ok(Self::HoldingRegister),
            "ir" | "input_register" | "input_registers" => Ok(Self::InputRegister),
            _ => Err(Error::UnknownBank(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bank;
    use std::str::FromStr;

    #[test]
    fn ut_bank_order() {
        for (i, bank) in Bank::ALL.iter().enumerate() {
            assert_eq!(bank.index(), i);
        }
        let mut sorted = Bank::ALL;
        sorted.sort();
        assert_eq!(sorted, Bank::ALL);
    }

    #[test]
    fn ut_bank_function_codes() {
        let codes: Vec<u8> = Bank::ALL.iter().map(|b| b.read_code().value()).collect();
        assert_eq!(codes, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(Bank::Coil.write_code().map(|c| c.value()), Some(0x0F));
        assert_eq!(
            Bank::HoldingRegister.write_code().map(|c| c.value()),
            Some(0x10)
        );
        assert!(Bank::DiscreteInput.write_code().is_none());
        assert!(Bank::InputRegister.write_code().is_none());
    }

    #[test]
    fn ut_bank_from_str() {
        assert_eq!(Bank::from_str("hr").unwrap(), Bank::HoldingRegister);
        assert_eq!(Bank::from_str("Discrete-Inputs").unwrap(), Bank::DiscreteInput);
        assert_eq!(Bank::from_str("coil").unwrap(), Bank::Coil);
        assert_eq!(Bank::from_str("input_register").unwrap(), Bank::InputRegister);
        assert!(Bank::from_str("register").is_err());
    }
}
