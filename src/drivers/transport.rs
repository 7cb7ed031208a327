#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};
#[cfg(test)]
use std::thread;
use std::time::Duration;
use crate::drivers::PlotterError;
/// Byte-oriented source the session reader pulls from.
///
/// `read_chunk` may block for at most the transport's read timeout and returns
/// `Ok(0)` when nothing arrived in that window. Any `Err` ends the session.
pub trait Transport: Send {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
/// A real serial port opened through the `serialport` crate.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}
impl SerialTransport {
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> Result<Self, PlotterError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| PlotterError::PortOpen {
                port: port_name.to_string(),
                source,
            })?;
        log::info!("opened serial port {port_name} at {baud_rate} baud");
        Ok(Self { port })
    }
}
impl Transport for SerialTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
/// Names of the serial ports the OS currently reports.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            log::warn!("failed to enumerate serial ports: {e}");
            Vec::new()
        }
    }
}
/// What a [`ManualTransport`] does once its scripted chunks run out.
#[cfg(test)]
#[derive(Clone, Debug)]
pub enum AfterScript {
    /// Behave like a quiet port: wait one timeout per read and return `Ok(0)`.
    Idle,
    /// Fail the next read, like a device that was unplugged.
    Fail(ErrorKind),
}
/// Scripted in-memory transport for driving sessions without hardware.
#[cfg(test)]
pub struct ManualTransport {
    queue: VecDeque<Vec<u8>>,
    after: AfterScript,
    timeout: Duration,
}
#[cfg(test)]
impl ManualTransport {
    pub fn new(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            queue: chunks.into_iter().collect(),
            after: AfterScript::Idle,
            timeout: Duration::from_millis(10),
        }
    }
    pub fn then(mut self, after: AfterScript) -> Self {
        self.after = after;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
#[cfg(test)]
impl Transport for ManualTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.queue.pop_front() else {
            return match self.after {
                AfterScript::Idle => {
                    thread::sleep(self.timeout);
                    Ok(0)
                }
                AfterScript::Fail(kind) => Err(io::Error::new(kind, "scripted transport failure")),
            };
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.queue.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}
