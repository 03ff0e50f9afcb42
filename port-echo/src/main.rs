use clap::Parser;
use port_echo::frame::ByteRepr;
use port_echo::transport::{SerialTransport, list_ports};
use port_echo::{Config, Error, PortEchoLoop, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read from a serial port, print what arrives, reply "hello", repeat.
#[derive(Debug, Parser)]
#[command(name = "port-echo", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overrides the config file
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides the config file
    #[arg(short, long)]
    baud: Option<u32>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}\t{}", port.name, port.kind);
    }
    Ok(())
}

/// 2 when the loop never started, 1 when the port failed while running
fn exit_status(err: &Error) -> u8 {
    if err.is_startup() { 2 } else { 1 }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_startup() {
                log::error!("Startup failed: {}", e);
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list_ports {
        return print_ports();
    }

    let config = cli.resolve_config()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::warn!("Received shutdown signal, stopping after this iteration");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let port = SerialTransport::open(&config.serial)?;

    println!("Listening on {}", config.serial.port);
    let mut echo = PortEchoLoop::new(port, config.echo);
    echo.run(&running, |report| {
        println!("{}  value={}", ByteRepr(&report.frame), report.value);
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from(["port-echo", "--port", "/dev/ttyACM0", "-b", "9600"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.echo.reply, "hello");
    }

    #[test]
    fn test_no_args_uses_defaults() {
        let cli = Cli::parse_from(["port-echo"]);
        assert!(!cli.list_ports);
        assert_eq!(cli.resolve_config().unwrap(), Config::default());
    }

    #[test]
    fn test_exit_status_separates_startup_from_runtime() {
        let startup = Error::PortUnavailable {
            port: "/dev/ttyNOPE".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
        };
        let runtime = Error::PortIo(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        ));
        assert_eq!(exit_status(&startup), 2);
        assert_eq!(exit_status(&Error::InvalidConfig("bad".into())), 2);
        assert_eq!(exit_status(&runtime), 1);
    }

    #[test]
    fn test_cli_rejects_zero_baud() {
        let cli = Cli::parse_from(["port-echo", "--baud", "0"]);
        assert!(matches!(
            cli.resolve_config(),
            Err(Error::InvalidConfig(_))
        ));
    }
}
