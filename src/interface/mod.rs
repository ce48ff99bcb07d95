#[cfg(unix)]
pub mod fd;
pub mod serialport;

use tracing::warn;

use crate::error::{ResetError, ResetResult};
use crate::signals::{ControlSignal, SignalSet};

/// A device whose modem-control output lines can be driven.
///
/// The device is opened and owned by the caller; a pulse only borrows it.
pub trait ModemControl {
    /// Drive a single line. `true` asserts it, `false` releases it.
    fn write_signal(&mut self, signal: ControlSignal, asserted: bool) -> ResetResult<()>;

    /// Assert every line in `signals`.
    ///
    /// On error the lines raised by this call are released again. If that
    /// release fails too, the error names the lines that may be stuck.
    fn assert_signals(&mut self, signals: SignalSet) -> ResetResult<()> {
        let mut raised = SignalSet::empty();
        for signal in signals {
            if let Err(e) = self.write_signal(signal, true) {
                if let Err(rollback) = self.deassert_signals(raised) {
                    warn!("Failed to release {} after assert error: {}", raised, rollback);
                    return Err(ResetError::Device(format!(
                        "{}; releasing again failed, {} may still be asserted: {}",
                        e, raised, rollback
                    )));
                }
                return Err(e);
            }
            raised.insert(signal);
        }
        Ok(())
    }

    /// Release every line in `signals`, attempting all of them even if one
    /// fails. Returns the first failure.
    fn deassert_signals(&mut self, signals: SignalSet) -> ResetResult<()> {
        let mut first_error = None;
        for signal in signals {
            if let Err(e) = self.write_signal(signal, false) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
