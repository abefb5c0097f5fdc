use std::io::{Read, Write};
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::envelope::{pack_request, parse_response};
use crate::error::{CommandError, Result};
use crate::ids;
use crate::requester::Requester;

/// Default per-operation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout for reboot requests. Deliberately short: the device may reset
/// before the acknowledgement is flushed, and callers treat that timeout as
/// acceptable.
pub const REBOOT_TIMEOUT: Duration = Duration::from_millis(300);

/// Typed command operations over a [`Requester`].
///
/// Each operation packs a command envelope, issues it as one request, and
/// validates the response: nonzero status becomes
/// [`CommandError::Device`], a payload that does not match the operation's
/// expected shape becomes [`CommandError::UnexpectedShape`].
pub struct CommandClient<T> {
    requester: Requester<T>,
    timeout: Duration,
}

impl<T: Read + Write> CommandClient<T> {
    /// Create a client with the default per-operation timeout.
    pub fn new(channel: T) -> Self {
        Self::with_timeout(channel, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-operation timeout.
    pub fn with_timeout(channel: T, timeout: Duration) -> Self {
        Self {
            requester: Requester::new(channel),
            timeout,
        }
    }

    /// Issue an arbitrary command and return its response payload.
    ///
    /// This is the escape hatch for vendor command sets; the typed
    /// operations below all route through it.
    pub fn execute(&mut self, cmd_id: u16, payload: &[u8]) -> Result<Bytes> {
        self.execute_with_timeout(cmd_id, payload, self.timeout)
    }

    /// Issue an arbitrary command with an explicit timeout.
    pub fn execute_with_timeout(
        &mut self,
        cmd_id: u16,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        let request = pack_request(cmd_id, payload);
        let raw = self.requester.request(&request, timeout)?;
        let (resp_cmd, status, data) = parse_response(&raw)?;
        debug!(
            cmd = ids::command_name(resp_cmd),
            %status,
            len = data.len(),
            "response parsed"
        );
        if !status.is_ok() {
            return Err(CommandError::Device {
                cmd_id: resp_cmd,
                status,
            });
        }
        Ok(raw.slice_ref(data))
    }

    /// Fetch the firmware build hash string.
    pub fn firmware_version(&mut self) -> Result<String> {
        let data = self.execute(ids::FW_VERSION, b"")?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Fetch device uptime in milliseconds.
    pub fn uptime_ms(&mut self) -> Result<u64> {
        let data = self.execute(ids::UPTIME, b"")?;
        if data.len() != 8 {
            return Err(CommandError::UnexpectedShape {
                cmd_id: ids::UPTIME,
                reason: "uptime payload must be 8 bytes",
            });
        }
        let lo = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let hi = u32::from_le_bytes(data[4..8].try_into().unwrap());
        Ok((u64::from(hi) << 32) | u64::from(lo))
    }

    /// Round-trip a payload through the device.
    pub fn echo(&mut self, payload: &[u8]) -> Result<Bytes> {
        self.execute(ids::ECHO, payload)
    }

    /// Read `len` bytes of flash starting at `addr`.
    pub fn flash_read(&mut self, addr: u32, len: u16) -> Result<Bytes> {
        if len == 0 || len > 256 {
            return Err(CommandError::InvalidArgument(
                "flash read length must be 1..=256",
            ));
        }
        let mut payload = [0u8; 6];
        payload[0..4].copy_from_slice(&addr.to_le_bytes());
        payload[4..6].copy_from_slice(&len.to_le_bytes());
        let data = self.execute(ids::FLASH_READ, &payload)?;
        if data.len() != len as usize {
            return Err(CommandError::UnexpectedShape {
                cmd_id: ids::FLASH_READ,
                reason: "flash read returned a different length than requested",
            });
        }
        Ok(data)
    }

    /// Request a device reboot.
    ///
    /// Uses [`REBOOT_TIMEOUT`]; a [`CommandError::Timeout`] may mean the
    /// device reset before flushing its acknowledgement.
    pub fn reboot(&mut self) -> Result<()> {
        self.execute_with_timeout(ids::REBOOT, b"", REBOOT_TIMEOUT)?;
        Ok(())
    }

    /// The per-operation timeout currently in effect.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the per-operation timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Borrow the underlying requester.
    pub fn requester(&self) -> &Requester<T> {
        &self.requester
    }

    /// Mutably borrow the underlying requester.
    pub fn requester_mut(&mut self) -> &mut Requester<T> {
        &mut self.requester
    }

    /// Consume the client and return the channel.
    pub fn into_inner(self) -> T {
        self.requester.into_inner()
    }
}
