// src/sensor.rs
use crate::config::{READ_TIMEOUT, SETTLE_DELAY};
use serialport::SerialPort;
use std::io::{self, BufRead, BufReader};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to open serial port {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial read failed: {0}")]
    Io(#[from] io::Error),
    #[error("serial line is not valid UTF-8")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Anything that can hand the engine one text line per tick.
pub trait LineSource {
    /// Returns `Ok(None)` when no input is pending, otherwise one decoded line.
    fn poll_line(&mut self) -> Result<Option<String>, SensorError>;
}

/// Serial session for an HC-SR04 board that prints one integer (cm) per line.
pub struct SensorSession {
    port_name: String,
    baud_rate: u32,
    reader: BufReader<Box<dyn SerialPort>>,
}

impl SensorSession {
    /// Opens the port once and waits for the board to come out of reset.
    pub fn connect(port_name: &str, baud_rate: u32) -> Result<Self, SensorError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SensorError::Open {
                port: port_name.to_string(),
                baud: baud_rate,
                source,
            })?;

        log::info!("Connecting to Arduino on {port_name}... please wait.");
        thread::sleep(SETTLE_DELAY);

        Ok(Self {
            port_name: port_name.to_string(),
            baud_rate,
            reader: BufReader::new(port),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn pending(&self) -> Result<bool, SensorError> {
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }
        Ok(self.reader.get_ref().bytes_to_read()? > 0)
    }
}

impl LineSource for SensorSession {
    fn poll_line(&mut self) -> Result<Option<String>, SensorError> {
        if !self.pending()? {
            return Ok(None);
        }
        read_line(&mut self.reader)
    }
}

/// Reads one `\n`-terminated line. A timeout mid-line drops the partial line and
/// counts as no input; the next tick starts on a fresh line.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, SensorError> {
    let mut raw = Vec::new();
    match reader.read_until(b'\n', &mut raw) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(String::from_utf8(raw)?)),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => {
            log::debug!("serial read timed out, dropping {} partial bytes", raw.len());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl Drop for SensorSession {
    fn drop(&mut self) {
        log::debug!("closing serial port {}", self.port_name);
    }
}

/// Names of the serial ports the OS currently reports, for startup diagnostics.
pub fn list_port_names() -> Vec<String> {
    serialport::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    /// Hands out `data` once, then fails every read with `kind`.
    struct Stalls {
        data: Option<Vec<u8>>,
        kind: io::ErrorKind,
    }

    impl Read for Stalls {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(d) => {
                    buf[..d.len()].copy_from_slice(&d);
                    Ok(d.len())
                }
                None => Err(io::Error::new(self.kind, "stalled")),
            }
        }
    }

    #[test]
    fn reads_one_line_at_a_time() {
        let mut r = Cursor::new(b"123\r\n45\n".to_vec());
        assert_eq!(read_line(&mut r).unwrap(), Some("123\r\n".to_owned()));
        assert_eq!(read_line(&mut r).unwrap(), Some("45\n".to_owned()));
        assert_eq!(read_line(&mut r).unwrap(), None);
    }

    #[test]
    fn timeout_mid_line_is_silent() {
        let mut r = BufReader::new(Stalls {
            data: Some(b"12".to_vec()),
            kind: io::ErrorKind::TimedOut,
        });
        assert_eq!(read_line(&mut r).unwrap(), None);
    }

    #[test]
    fn other_io_failures_are_errors() {
        let mut r = BufReader::new(Stalls {
            data: None,
            kind: io::ErrorKind::BrokenPipe,
        });
        assert!(matches!(read_line(&mut r), Err(SensorError::Io(_))));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut r = Cursor::new(vec![0xff, 0xfe, b'\n']);
        assert!(matches!(read_line(&mut r), Err(SensorError::Decode(_))));
    }
}
