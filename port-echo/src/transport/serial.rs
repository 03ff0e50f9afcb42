//! Serial transport implementation

use super::Transport;
use crate::config::SerialConfig;
use crate::error::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use std::io::{self, Read, Write};

/// Serial transport for UART communication
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open the configured port at its baud rate and read timeout (8N1, no flow control)
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout())
            .open()
            .map_err(|source| Error::PortUnavailable {
                port: config.port.clone(),
                source,
            })?;

        log::info!(
            "Opened serial port: {} at {} baud (read timeout {:?})",
            config.port,
            config.baud_rate,
            config.read_timeout()
        );

        Ok(SerialTransport {
            port,
            name: config.port.clone(),
        })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A serial port as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: String,
}

/// Enumerate the serial ports present on this machine
pub fn list_ports() -> Result<Vec<PortSummary>> {
    let ports = serialport::available_ports().map_err(Error::PortList)?;
    Ok(ports
        .into_iter()
        .map(|p| PortSummary {
            kind: describe_port_type(&p.port_type),
            name: p.port_name,
        })
        .collect())
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut kind = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                kind.push(' ');
                kind.push_str(product);
            }
            kind
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_port() {
        let config = SerialConfig {
            port: "/dev/port-echo-does-not-exist".to_string(),
            ..SerialConfig::default()
        };

        match SerialTransport::open(&config) {
            Err(Error::PortUnavailable { port, .. }) => {
                assert_eq!(port, "/dev/port-echo-does-not-exist")
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }

    #[test]
    fn test_describe_port_type() {
        assert_eq!(describe_port_type(&SerialPortType::PciPort), "PCI");
        assert_eq!(describe_port_type(&SerialPortType::Unknown), "unknown");
    }
}
