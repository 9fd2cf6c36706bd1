//! Console format for audit reports
//!
//! Renders an [`AuditReport`] as one line per account followed by the total
//! and a verdict:
//!
//! ```text
//! Account[0] balance 120
//! Account[1] balance 80
//! Total balance: 200
//! Total balance unchanged.
//! ```

use crate::core::AuditObserver;
use crate::types::AuditReport;
use parking_lot::Mutex;
use std::io::Write;
use tracing::warn;

/// Write an audit report in the console format
///
/// # Arguments
///
/// * `report` - The audit snapshot to render
/// * `output` - Mutable reference to a writer for the report lines
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_audit_report(report: &AuditReport, output: &mut dyn Write) -> Result<(), String> {
    let mut write_line = |line: String| {
        writeln!(output, "{}", line).map_err(|e| format!("Failed to write audit report: {}", e))
    };

    for (id, balance) in &report.balances {
        write_line(format!("Account[{}] balance {}", id, balance))?;
    }
    write_line(format!("Total balance: {}", report.total))?;
    if report.is_balanced() {
        write_line("Total balance unchanged.".to_string())?;
    } else {
        write_line("Total balance changed!".to_string())?;
    }

    Ok(())
}

/// Audit observer that prints every report to a shared writer
///
/// Reports are written whole under a lock so concurrent audits on different
/// ledgers sharing one writer never interleave lines.
pub struct AuditPrinter {
    output: Mutex<Box<dyn Write + Send>>,
}

impl AuditPrinter {
    /// Create a printer writing to `output`
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(output),
        }
    }

    /// Create a printer writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl AuditObserver for AuditPrinter {
    fn on_audit(&self, report: &AuditReport) {
        let mut output = self.output.lock();
        if let Err(e) = write_audit_report(report, output.as_mut()) {
            warn!(sequence = report.sequence, "{}", e);
        }
    }
}
