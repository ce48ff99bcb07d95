use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

use tracing::trace;

use super::ModemControl;
use crate::error::{ResetError, ResetResult};
use crate::signals::{ControlSignal, SignalSet};

/// Terminal descriptor opened by someone else, e.g. stdin of the process.
///
/// Lines are changed with `TIOCMBIS`/`TIOCMBIC`, so every line in a set is
/// switched by a single ioctl.
pub struct TtyFd<'fd> {
    fd: BorrowedFd<'fd>,
}

impl<'fd> TtyFd<'fd> {
    /// Fails when `fd` is closed or is not a terminal with modem-control
    /// lines.
    pub fn new(fd: BorrowedFd<'fd>) -> ResetResult<Self> {
        let tty = TtyFd { fd };
        tty.modem_status().map_err(|e| {
            ResetError::Device(format!(
                "fd {} does not support modem control: {}",
                tty.fd.as_raw_fd(),
                e
            ))
        })?;
        Ok(tty)
    }

    fn modem_status(&self) -> io::Result<libc::c_int> {
        let mut status: libc::c_int = 0;
        // SAFETY: the descriptor is borrowed for 'fd and TIOCMGET writes one c_int
        let ret = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                libc::TIOCMGET,
                &mut status as *mut libc::c_int,
            )
        };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(status)
    }

    fn modify(&mut self, signals: SignalSet, asserted: bool) -> ResetResult<()> {
        if signals.is_empty() {
            return Ok(());
        }

        let bits = signals.tiocm_bits();
        let request = if asserted {
            libc::TIOCMBIS
        } else {
            libc::TIOCMBIC
        };
        // SAFETY: the descriptor is borrowed for 'fd and the request reads one c_int
        let ret =
            unsafe { libc::ioctl(self.fd.as_raw_fd(), request, &bits as *const libc::c_int) };
        if ret == -1 {
            return Err(ResetError::Device(format!(
                "Failed to set {} {}: {}",
                signals,
                asserted,
                io::Error::last_os_error()
            )));
        }

        trace!("Set {} {}", signals, asserted);
        Ok(())
    }
}

impl ModemControl for TtyFd<'_> {
    fn write_signal(&mut self, signal: ControlSignal, asserted: bool) -> ResetResult<()> {
        self.modify(signal.into(), asserted)
    }

    fn assert_signals(&mut self, signals: SignalSet) -> ResetResult<()> {
        self.modify(signals, true)
    }

    fn deassert_signals(&mut self, signals: SignalSet) -> ResetResult<()> {
        self.modify(signals, false)
    }
}
