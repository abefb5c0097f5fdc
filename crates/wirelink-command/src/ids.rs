//! Built-in command ids.
//!
//! Ids 0x0001-0x00FF are reserved for core device commands; vendor command
//! sets start at 0x0100.

/// Return the firmware build hash string.
pub const FW_VERSION: u16 = 0x0001;

/// Return device uptime in milliseconds (two little-endian u32 halves).
pub const UPTIME: u16 = 0x0002;

/// Read a whitelisted flash region.
pub const FLASH_READ: u16 = 0x0003;

/// Reboot the device.
pub const REBOOT: u16 = 0x0004;

/// Echo the request payload.
pub const ECHO: u16 = 0x0005;

/// First vendor-defined command id.
pub const VENDOR_START: u16 = 0x0100;

/// Returns a human-readable name for a command id.
pub fn command_name(id: u16) -> &'static str {
    match id {
        FW_VERSION => "FW_VERSION",
        UPTIME => "UPTIME",
        FLASH_READ => "FLASH_READ",
        REBOOT => "REBOOT",
        ECHO => "ECHO",
        0x0000 | 0x0006..=0x00FF => "RESERVED",
        _ => "VENDOR",
    }
}
