//! Reset microcontroller boards by pulsing the RTS/DTR modem-control lines of
//! a serial port.

pub use boards::{Board, ResetProfile};
pub use error::{ResetError, ResetResult};
pub use interface::ModemControl;
pub use pulse::{pulse_reset, pulse_reset_interruptible};
pub use signals::{ControlSignal, SignalSet};

pub mod boards;
pub mod constants;
pub mod error;
pub mod interface;
pub mod pulse;
pub mod signals;
