use crate::instance::{Error, Instance, Status};

use log::Logger;
use register::{canonical_address, BankConfig, RegisterValue, ValueTable, WatchGate};

/// Outcome of one write over all watched banks
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub attempted: usize,
    pub succeeded: usize,
    pub parse_errors: usize,
}

/// Push the entered values of every watched bank to the remote device or the served store.
///
/// Cells that do not parse are written as zero/false, marked in `table` and logged.
pub async fn write(
    instance: &mut Instance,
    config: &BankConfig,
    watch: &WatchGate,
    table: &mut ValueTable,
    log: &Logger,
) -> Result<Report, Error> {
    let Some(mut target) = instance.target() else {
        return Err(Error::InvalidState(Status::Idle));
    };

    let mut report = Report::default();
    for bank in watch.watched() {
        let window = *config.window(bank);
        let entries = table.entries(bank);

        let mut values = Vec::with_capacity(entries.len());
        for (row, (token, offset)) in entries.iter().zip(window.offsets()).enumerate() {
            let (value, error) = RegisterValue::parse_lenient(bank, token);
            if let Some(e) = error {
                table.mark_error(bank, row);
                report.parse_errors += 1;
                log.err(format!(
                    "{} at {}, writing {} instead.",
                    e,
                    canonical_address(bank, offset),
                    value
                ));
            }
            values.push(value);
        }

        report.attempted += 1;
        match target.write(bank, *window.start(), &values).await {
            Ok(()) => {
                report.succeeded += 1;
                log.ok(format!(
                    "Wrote {} values to {} starting at {}.",
                    values.len(),
                    bank,
                    canonical_address(bank, *window.start())
                ));
            }
            Err(e) => log.err(format!("Write of {} failed. [{}]", bank, e)),
        }
    }

    log.info(format!(
        "Write finished. {} of {} banks succeeded.",
        report.succeeded, report.attempted
    ));
    Ok(report)
}
