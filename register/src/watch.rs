use crate::enums::Bank;

/// Per bank enable flags consulted by polling and writing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchGate {
    flags: [bool; 4],
}

impl WatchGate {
    pub fn is_watched(&self, bank: Bank) -> bool {
        self.flags[bank.index()]
    }

    pub fn set(&mut self, bank: Bank, watched: bool) {
        self.flags[bank.index()] = watched;
    }

    pub fn toggle(&mut self, bank: Bank) -> bool {
        let flag = &mut self.flags[bank.index()];
        *flag = !*flag;
        *flag
    }

    /// Watched banks in processing order
    pub fn watched(&self) -> impl Iterator<Item = Bank> + '_ {
        Bank::ALL.into_iter().filter(|b| self.is_watched(*b))
    }
}

#[cfg(test)]
mod tests {
    use super::WatchGate;
    use crate::enums::Bank;

    #[test]
    fn ut_watch_gate() {
        let mut gate = WatchGate::default();
        assert_eq!(gate.watched().count(), 0);

        gate.set(Bank::InputRegister, true);
        assert!(gate.toggle(Bank::Coil));
        assert_eq!(
            gate.watched().collect::<Vec<_>>(),
            vec![Bank::Coil, Bank::InputRegister]
        );

        assert!(!gate.toggle(Bank::Coil));
        assert!(!gate.is_watched(Bank::Coil));
        assert!(gate.is_watched(Bank::InputRegister));
    }
}
