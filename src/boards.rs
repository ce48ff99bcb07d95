use std::time::Duration;

use clap::ValueEnum;

use crate::{
    constants::{DEFAULT_HOLD_MS, POST_RESET_BOOTUP_DELAY_MS},
    error::{ResetError, ResetResult},
    signals::SignalSet,
};

/// Boards with a capacitor-coupled auto-reset circuit that have been tested
/// with autoreset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Board {
    /// Atmega328p behind a USB serial bridge
    ArduinoUno,

    /// Same as Arduino Uno
    Atmega328p,

    /// Arduino Nano
    ArduinoNano,

    /// Arduino Mega
    ArduinoMega,

    /// Marlin 3D printer controllers (RAMPS and other Mega based boards)
    MarlinPrinter,
}

/// How a board wants to be reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetProfile {
    pub signals: SignalSet,
    pub hold: Duration,

    /// Time for the bootloader to come up after the lines are released
    pub settle: Duration,

    /// USB product ids of the serial bridges the board ships with
    pub product_ids: &'static [u16],
}

impl Board {
    pub fn profile(&self) -> ResetProfile {
        let product_ids: &'static [u16] = match self {
            Board::ArduinoUno | Board::Atmega328p => &[0x0043, 0x7523, 0x0001, 0xea60, 0x6015],
            Board::ArduinoNano => &[0x6001, 0x7523],
            Board::ArduinoMega => &[0x0042, 0x0010, 0x6001, 0x7523],
            Board::MarlinPrinter => &[0x0042, 0x0010, 0x6001, 0x7523, 0x6015],
        };

        ResetProfile {
            signals: SignalSet::BOTH,
            hold: Duration::from_millis(DEFAULT_HOLD_MS),
            settle: Duration::from_millis(POST_RESET_BOOTUP_DELAY_MS),
            product_ids,
        }
    }
}

/// Find the first USB serial port whose product id is one of `product_ids`
pub fn serial_port_from_product_id(product_ids: &[u16]) -> ResetResult<String> {
    let ports = serialport::available_ports().map_err(|e| {
        ResetError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    port_matching_product_id(ports, product_ids).ok_or_else(|| {
        ResetError::Configuration(format!(
            "Looked at all available serial ports; could not find one that matches one of \
            product IDs {:04x?}. Try specifying a serial port for the given board?",
            product_ids
        ))
    })
}

fn port_matching_product_id(
    ports: Vec<serialport::SerialPortInfo>,
    product_ids: &[u16],
) -> Option<String> {
    ports.into_iter().find_map(|port| match port.port_type {
        serialport::SerialPortType::UsbPort(info) if product_ids.contains(&info.pid) => {
            Some(port.port_name)
        }
        _ => None,
    })
}
