//! Transport abstraction
//!
//! The exchange loop only needs a handful of operations from the link, so it
//! talks to a [`Transport`] instead of a concrete serial port. Tests and the
//! demo simulator plug in their own implementations.

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Byte-oriented duplex channel to one projector
pub trait Transport: Read + Write + Send {
    /// Set timeout for blocking read/write operations
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Discard bytes received but not yet read
    fn clear_input_buffer(&mut self) -> io::Result<()>;

    /// Discard bytes written but not yet transmitted
    fn clear_output_buffer(&mut self) -> io::Result<()>;

    /// Get number of bytes available to read without blocking
    fn bytes_to_read(&mut self) -> io::Result<u32>;

    /// Discard stale bytes in both directions
    fn discard_buffers(&mut self) -> io::Result<()> {
        self.clear_input_buffer()?;
        self.clear_output_buffer()
    }
}

/// Serial port wrapper implementing Transport
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an opened port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Name of the underlying port, if the driver reports one
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialChannel {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout).map_err(io::Error::other)
    }

    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::other)
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Output)
            .map_err(io::Error::other)
    }

    fn discard_buffers(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(io::Error::other)
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        self.port.bytes_to_read().map_err(io::Error::other)
    }
}
