pub const DEFAULT_HOLD_MS: u64 = 100;
pub const POST_RESET_BOOTUP_DELAY_MS: u64 = 250;

pub(crate) const HOLD_POLL_INTERVAL_MICROS: u64 = 1000;

/// Only used to satisfy the port builder, no data is ever exchanged
pub(crate) const OPEN_BAUD_RATE: u32 = 115200;
pub(crate) const SERIAL_TIMEOUT_MS: u64 = 1;
