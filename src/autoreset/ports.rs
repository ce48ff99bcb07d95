use autoreset::error::{ResetError, ResetResult};
use serialport::SerialPortType;
use tracing::info;

pub(crate) fn handle_list() -> ResetResult<()> {
    let ports = serialport::available_ports().map_err(|e| {
        ResetError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    if ports.is_empty() {
        info!("No serial ports found");
    }

    for port in ports {
        let kind = match port.port_type {
            SerialPortType::UsbPort(info) => format!(
                "USB {:04x}:{:04x} {}",
                info.vid,
                info.pid,
                info.product.unwrap_or_default()
            ),
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::Unknown => "Unknown".to_string(),
        };
        println!("{}\t{}", port.port_name, kind.trim_end());
    }

    Ok(())
}
