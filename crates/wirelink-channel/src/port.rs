use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ChannelError, Result};

/// An already-configured character device opened as a duplex byte stream.
///
/// `LinkPort` opens the path read+write with `O_NONBLOCK | O_NOCTTY`, so an
/// empty read surfaces as `ErrorKind::WouldBlock` instead of stalling a
/// polling loop. Line discipline (baud rate, raw mode, parity) is not touched
/// here — the device is expected to be configured by the test rig before the
/// port is opened, the same way a socket is expected to be connected.
#[derive(Debug)]
pub struct LinkPort {
    file: File,
    path: PathBuf,
}

impl LinkPort {
    /// Open a device path as a non-blocking duplex channel.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| ChannelError::Open {
                path: path.clone(),
                source,
            })?;
        debug!(?path, "opened link port");
        Ok(Self { file, path })
    }

    /// The path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the underlying file.
    pub fn get_ref(&self) -> &File {
        &self.file
    }

    /// Consume the port and return the underlying file.
    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Read for LinkPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for LinkPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}
