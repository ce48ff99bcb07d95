use std::sync::atomic::AtomicBool;
use std::time::Duration;

use autoreset::{
    Board, ControlSignal, ModemControl, SignalSet,
    boards::serial_port_from_product_id,
    constants::DEFAULT_HOLD_MS,
    error::{ResetError, ResetResult},
    interface::serialport::SerialPortDevice,
    pulse_reset_interruptible,
};
use clap::Parser;
use tracing::{debug, error, info, warn};

/// Raised by SIGINT/SIGTERM while a pulse is running
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug, Clone)]
pub(crate) struct ResetOptions {
    /// Board type, selects reset timing and is used to find the serial port
    #[clap(short, long)]
    board: Option<Board>,

    /// Serial port
    #[clap(short, long)]
    serial: Option<String>,

    /// Pulse the terminal on standard input instead of opening a port
    #[clap(long, default_value_t = false)]
    stdin: bool,

    /// Control lines to pulse, comma separated
    #[clap(short = 'l', long = "signals", value_delimiter = ',')]
    signals: Vec<ControlSignal>,

    /// How long the lines stay asserted, in milliseconds
    #[clap(short = 't', long)]
    hold_ms: Option<u64>,

    /// Time to wait for the board to boot after the pulse, in milliseconds
    #[clap(long)]
    settle_ms: Option<u64>,

    #[clap(short, long, default_value_t = false)]
    pub(crate) verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct PulsePlan {
    signals: SignalSet,
    hold: Duration,
    settle: Duration,
}

/// Explicit flags win over the board profile, which wins over the defaults
fn plan(opts: &ResetOptions) -> PulsePlan {
    let profile = opts.board.map(|board| board.profile());

    let signals = if opts.signals.is_empty() {
        profile.map_or(SignalSet::BOTH, |p| p.signals)
    } else {
        opts.signals.iter().copied().collect()
    };

    let hold = opts
        .hold_ms
        .map(Duration::from_millis)
        .or(profile.map(|p| p.hold))
        .unwrap_or(Duration::from_millis(DEFAULT_HOLD_MS));

    let settle = opts
        .settle_ms
        .map(Duration::from_millis)
        .or(profile.map(|p| p.settle))
        .unwrap_or(Duration::ZERO);

    PulsePlan {
        signals,
        hold,
        settle,
    }
}

pub(crate) fn handle_reset(opts: ResetOptions) -> ResetResult<()> {
    let plan = plan(&opts);
    debug!("Reset plan {:?}", plan);

    if opts.stdin {
        if opts.serial.is_some() {
            return Err(ResetError::Configuration(
                "--serial and --stdin cannot be used together".to_string(),
            ));
        }
        reset_stdin(&plan)?;
    } else {
        let port = match (opts.serial, opts.board) {
            (Some(port), _) => port,
            (None, Some(board)) => serial_port_from_product_id(board.profile().product_ids)?,
            (None, None) => {
                return Err(ResetError::Configuration(
                    "No serial port given; pass --serial, --stdin or --board".to_string(),
                ));
            }
        };

        info!("Resetting board on {}", port);
        let mut device = SerialPortDevice::open(&port)?;
        debug!("Opened {:?}", device.name());
        fire(&mut device, &plan)?;
        device.close();
    }

    if !plan.settle.is_zero() {
        debug!("Waiting {:?} for the board to boot", plan.settle);
        std::thread::sleep(plan.settle);
    }

    Ok(())
}

#[cfg(unix)]
fn reset_stdin(plan: &PulsePlan) -> ResetResult<()> {
    use std::os::fd::AsFd;

    use autoreset::interface::fd::TtyFd;

    let stdin = std::io::stdin();
    let mut tty = TtyFd::new(stdin.as_fd())?;
    info!("Resetting board on stdin");
    fire(&mut tty, plan)
}

#[cfg(not(unix))]
fn reset_stdin(_plan: &PulsePlan) -> ResetResult<()> {
    Err(ResetError::Configuration(
        "--stdin is only supported on unix".to_string(),
    ))
}

fn fire(device: &mut dyn ModemControl, plan: &PulsePlan) -> ResetResult<()> {
    // Ctrl-C only cuts the hold short while the lines are asserted
    let _interrupt = InterruptGuard::install()?;

    info!("Pulsing {} for {:?}", plan.signals, plan.hold);
    match pulse_reset_interruptible(device, plan.signals, plan.hold, &INTERRUPTED) {
        Ok(()) => {
            info!("Released {}", plan.signals);
            Ok(())
        }
        Err(e) => {
            error!("Reset failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(unix)]
extern "C" fn on_interrupt(_signum: libc::c_int) {
    INTERRUPTED.store(true, std::sync::atomic::Ordering::Release);
}

#[cfg(unix)]
fn interrupt_handler() -> libc::sighandler_t {
    on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t
}

/// Routes SIGINT/SIGTERM to [`INTERRUPTED`] until dropped, then puts the
/// previous dispositions back
#[cfg(unix)]
struct InterruptGuard {
    previous: Vec<(libc::c_int, libc::sigaction)>,
}

#[cfg(unix)]
impl InterruptGuard {
    fn install() -> ResetResult<Self> {
        INTERRUPTED.store(false, std::sync::atomic::Ordering::Release);

        let mut guard = InterruptGuard {
            previous: Vec::new(),
        };
        for signum in [libc::SIGINT, libc::SIGTERM] {
            // SAFETY: an all-zero sigaction is a valid value, every field we
            // rely on is set below
            let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
            let mut previous: libc::sigaction = unsafe { std::mem::zeroed() };
            action.sa_sigaction = interrupt_handler();

            // SAFETY: both pointers refer to live sigaction values and the
            // handler only stores to an atomic
            let ret = unsafe {
                libc::sigemptyset(&mut action.sa_mask);
                libc::sigaction(signum, &action, &mut previous)
            };
            if ret == -1 {
                // Dropping the guard restores the handlers already swapped
                return Err(ResetError::Configuration(format!(
                    "Failed to install handler for signal {}: {}",
                    signum,
                    std::io::Error::last_os_error()
                )));
            }
            guard.previous.push((signum, previous));
        }

        Ok(guard)
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        for (signum, previous) in self.previous.drain(..) {
            // SAFETY: `previous` was filled in by sigaction when installing
            let ret = unsafe { libc::sigaction(signum, &previous, std::ptr::null_mut()) };
            if ret == -1 {
                warn!(
                    "Failed to restore handler for signal {}: {}",
                    signum,
                    std::io::Error::last_os_error()
                );
            }
        }
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn install() -> ResetResult<Self> {
        Ok(InterruptGuard)
    }
}
