#[cfg(test)]
mod tests {
    use std::time::Duration;

    use autoreset::{Board, SignalSet, interface::serialport::SerialPortDevice, pulse_reset};

    fn test_port() -> String {
        std::env::var("AUTORESET_TEST_PORT").unwrap_or("/dev/ttyUSB0".to_string())
    }

    /// Needs a board attached, e.g.
    /// `AUTORESET_TEST_PORT=/dev/ttyUSB0 cargo test -- --ignored`
    #[test]
    #[ignore]
    fn test_arduino_reset() {
        let profile = Board::ArduinoUno.profile();

        let mut device = SerialPortDevice::open(&test_port()).unwrap();
        pulse_reset(&mut device, profile.signals, profile.hold).unwrap();
        pulse_reset(&mut device, SignalSet::DTR, Duration::from_secs(1)).unwrap();
        device.close();
    }

    #[test]
    #[ignore]
    fn test_reset_on_caller_owned_port() {
        let mut port = serialport::new(test_port(), 115200)
            .dtr_on_open(false)
            .open()
            .unwrap();

        // Borrowed, the port stays open afterwards
        pulse_reset(&mut port, SignalSet::BOTH, Duration::from_millis(100)).unwrap();
        port.write_request_to_send(false).unwrap();

        let mut device = SerialPortDevice::from_port(port);
        pulse_reset(&mut device, SignalSet::RTS, Duration::ZERO).unwrap();
    }
}
