use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::enums::Bank;
use crate::error::ParseError;

const TRUE_TOKENS: [&str; 3] = ["1", "true", "on"];
const FALSE_TOKENS: [&str; 4] = ["", "0", "false", "off"];

/// Single element of a bank: a bit for coils/discrete inputs, a word for registers
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterValue {
    Bit(bool),
    Word(u16),
}

impl RegisterValue {
    pub fn zero(bank: Bank) -> Self {
        if bank.is_bit() {
            Self::Bit(false)
        } else {
            Self::Word(0)
        }
    }

    /// Interpret a raw memory cell for `bank`
    pub fn from_raw(bank: Bank, raw: u16) -> Self {
        if bank.is_bit() {
            Self::Bit(raw != 0)
        } else {
            Self::Word(raw)
        }
    }

    pub fn raw(&self) -> u16 {
        match self {
            Self::Bit(v) => *v as u16,
            Self::Word(v) => *v,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bit(_) => "bit",
            Self::Word(_) => "word",
        }
    }

    pub fn fits(&self, bank: Bank) -> bool {
        matches!(self, Self::Bit(_)) == bank.is_bit()
    }

    /// Strict parse of an operator entry. Surrounding whitespace and case are ignored.
    pub fn parse(bank: Bank, token: &str) -> Result<Self, ParseError> {
        let normalized = token.trim().to_ascii_lowercase();
        if bank.is_bit() {
            if TRUE_TOKENS.contains(&normalized.as_str()) {
                Ok(Self::Bit(true))
            } else if FALSE_TOKENS.contains(&normalized.as_str()) {
                Ok(Self::Bit(false))
            } else {
                Err(ParseError {
                    bank,
                    token: token.to_owned(),
                    expected: "boolean",
                })
            }
        } else if normalized.is_empty() {
            Ok(Self::Word(0))
        } else {
            normalized.parse::<u16>().map(Self::Word).map_err(|_| ParseError {
                bank,
                token: token.to_owned(),
                expected: "value in 0..=65535",
            })
        }
    }

    /// Parse that never fails: unparsable input yields the bank's zero value plus the error
    pub fn parse_lenient(bank: Bank, token: &str) -> (Self, Option<ParseError>) {
        match Self::parse(bank, token) {
            Ok(v) => (v, None),
            Err(e) => (Self::zero(bank), Some(e)),
        }
    }
}

impl Display for RegisterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bit(v) => write!(f, "{}", *v as u8),
            Self::Word(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RegisterValue;
    use crate::enums::Bank;

    #[test]
    fn ut_parse_bits() {
        for token in ["1", "true", "TRUE", " On ", "on"] {
            assert_eq!(
                RegisterValue::parse(Bank::Coil, token),
                Ok(RegisterValue::Bit(true))
            );
        }
        for token in ["0", "false", "Off", ""] {
            assert_eq!(
                RegisterValue::parse(Bank::DiscreteInput, token),
                Ok(RegisterValue::Bit(false))
            );
        }
        assert!(RegisterValue::parse(Bank::Coil, "yes").is_err());
    }

    #[test]
    fn ut_parse_words() {
        assert_eq!(
            RegisterValue::parse(Bank::HoldingRegister, " 65535"),
            Ok(RegisterValue::Word(65535))
        );
        assert_eq!(
            RegisterValue::parse(Bank::InputRegister, ""),
            Ok(RegisterValue::Word(0))
        );
        assert!(RegisterValue::parse(Bank::HoldingRegister, "65536").is_err());
        assert!(RegisterValue::parse(Bank::HoldingRegister, "-1").is_err());
        assert!(RegisterValue::parse(Bank::HoldingRegister, "abc").is_err());
    }

    #[test]
    fn ut_parse_lenient() {
        let (value, error) = RegisterValue::parse_lenient(Bank::HoldingRegister, "abc");
        assert_eq!(value, RegisterValue::Word(0));
        let error = error.unwrap();
        assert_eq!(error.token, "abc");
        assert_eq!(error.bank, Bank::HoldingRegister);

        let (value, error) = RegisterValue::parse_lenient(Bank::Coil, "maybe");
        assert_eq!(value, RegisterValue::Bit(false));
        assert!(error.is_some());

        let (value, error) = RegisterValue::parse_lenient(Bank::Coil, "On");
        assert_eq!(value, RegisterValue::Bit(true));
        assert!(error.is_none());
    }

    #[test]
    fn ut_value_raw() {
        assert_eq!(RegisterValue::from_raw(Bank::Coil, 7), RegisterValue::Bit(true));
        assert_eq!(RegisterValue::from_raw(Bank::InputRegister, 7), RegisterValue::Word(7));
        assert_eq!(RegisterValue::Bit(true).raw(), 1);
        assert!(RegisterValue::Word(1).fits(Bank::HoldingRegister));
        assert!(!RegisterValue::Word(1).fits(Bank::Coil));
        assert_eq!(RegisterValue::Bit(true).to_string(), "1");
        assert_eq!(RegisterValue::Word(42).to_string(), "42");
    }
}
