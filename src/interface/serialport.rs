use std::time::Duration;

use tracing::trace;

use super::ModemControl;
use crate::constants::{OPEN_BAUD_RATE, SERIAL_TIMEOUT_MS};
use crate::error::{ResetError, ResetResult};
use crate::signals::ControlSignal;

fn write_line<P>(port: &mut P, signal: ControlSignal, asserted: bool) -> ResetResult<()>
where
    P: ::serialport::SerialPort + ?Sized,
{
    let result = match signal {
        ControlSignal::RequestToSend => port.write_request_to_send(asserted),
        ControlSignal::DataTerminalReady => port.write_data_terminal_ready(asserted),
    };
    result.map_err(|e| {
        ResetError::Device(format!("Failed to set {} {}: {:?}", signal, asserted, e))
    })?;

    trace!("Set {} {}", signal, asserted);
    Ok(())
}

/// Serial port opened for the sole purpose of driving its control lines
pub struct SerialPortDevice {
    pub serial_port: Box<dyn ::serialport::SerialPort>,
}

impl SerialPortDevice {
    /// Open `port` without raising DTR, so opening does not itself reset the
    /// board.
    pub fn open(port: &str) -> ResetResult<SerialPortDevice> {
        let serial_port = ::serialport::new(port, OPEN_BAUD_RATE)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
            .dtr_on_open(false)
            .open()
            .map_err(|e| ResetError::Device(format!("Failed to open {}: {:?}", port, e)))?;

        Ok(SerialPortDevice { serial_port })
    }

    pub fn from_port(serial_port: Box<dyn ::serialport::SerialPort>) -> SerialPortDevice {
        SerialPortDevice { serial_port }
    }

    pub fn name(&self) -> Option<String> {
        self.serial_port.name()
    }

    /// Close the port now instead of on drop
    pub fn close(self) {
        drop(self.serial_port);
    }
}

impl ModemControl for SerialPortDevice {
    fn write_signal(&mut self, signal: ControlSignal, asserted: bool) -> ResetResult<()> {
        write_line(&mut *self.serial_port, signal, asserted)
    }
}

/// Ports opened elsewhere can be pulsed directly and stay owned by the caller
impl ModemControl for Box<dyn ::serialport::SerialPort> {
    fn write_signal(&mut self, signal: ControlSignal, asserted: bool) -> ResetResult<()> {
        write_line(&mut **self, signal, asserted)
    }
}
