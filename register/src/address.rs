use crate::enums::Bank;

fn base(bank: Bank) -> u32 {
    match bank {
        Bank::Coil => 0,
        Bank::DiscreteInput => 10000,
        Bank::HoldingRegister => 40000,
        Bank::InputRegister => 30000,
    }
}

/// Numeric Modbus reference for `offset` within `bank`
pub fn reference(bank: Bank, offset: u16) -> u32 {
    base(bank) + offset as u32
}

/// Five digit reference label, e.g. `00005` for coil 5 or `40005` for holding register 5
pub fn canonical_address(bank: Bank, offset: u16) -> String {
    format!("{:05}", reference(bank, offset))
}

#[cfg(test)]
mod tests {
    use super::{canonical_address, reference};
    use crate::enums::Bank;
    use crate::window::MAX_START;

    #[test]
    fn ut_canonical_address() {
        assert_eq!(canonical_address(Bank::Coil, 5), "00005");
        assert_eq!(canonical_address(Bank::DiscreteInput, 5), "10005");
        assert_eq!(canonical_address(Bank::HoldingRegister, 5), "40005");
        assert_eq!(canonical_address(Bank::InputRegister, 5), "30005");
        assert_eq!(canonical_address(Bank::HoldingRegister, 0), "40000");
        assert_eq!(reference(Bank::InputRegister, 9999), 39999);
    }

    #[test]
    fn ut_canonical_address_partitions() {
        for bank in Bank::ALL {
            let prefix = canonical_address(bank, 0).chars().next();
            for offset in 0..=MAX_START {
                let label = canonical_address(bank, offset);
                assert_eq!(label.len(), 5);
                assert_eq!(label.chars().next(), prefix);
                assert_eq!(label, canonical_address(bank, offset));
            }
        }
        let prefixes: Vec<_> = Bank::ALL
            .iter()
            .map(|b| canonical_address(*b, MAX_START).chars().next())
            .collect();
        assert_eq!(prefixes, vec![Some('0'), Some('1'), Some('4'), Some('3')]);
    }
}
