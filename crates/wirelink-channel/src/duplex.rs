use std::io::{Read, Write};

/// Glues an independent read half and write half into one duplex stream.
///
/// Some transports expose their two directions as distinct objects — a
/// notification buffer fed by a BLE callback on the inbound side and a GATT
/// characteristic writer on the outbound side, or the two ends of a pipe
/// pair under test. `Duplex` lets such a pair satisfy the `Read + Write`
/// bound the layers above expect from a single channel value.
pub struct Duplex<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> Duplex<R, W> {
    /// Combine a read half and a write half.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Borrow the read half.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Borrow the write half.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consume the duplex and return both halves.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W> Read for Duplex<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for Duplex<R, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
