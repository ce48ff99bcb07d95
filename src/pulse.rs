use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::constants::HOLD_POLL_INTERVAL_MICROS;
use crate::error::{ResetError, ResetResult};
use crate::interface::ModemControl;
use crate::signals::SignalSet;

/// Assert `signals` on `device`, hold them for `hold`, then release them.
///
/// On `Ok(())` every line in `signals` is released again and no other line
/// has been written. If asserting fails the pulse stops there and nothing is
/// held.
pub fn pulse_reset(
    device: &mut dyn ModemControl,
    signals: SignalSet,
    hold: Duration,
) -> ResetResult<()> {
    pulse_with(device, signals, || {
        std::thread::sleep(hold);
        Ok(())
    })
}

/// Same as [`pulse_reset`], but the hold ends early once `interrupt` is set.
///
/// An interrupted hold still releases the lines and then returns
/// [`ResetError::TimingInterrupted`].
pub fn pulse_reset_interruptible(
    device: &mut dyn ModemControl,
    signals: SignalSet,
    hold: Duration,
    interrupt: &AtomicBool,
) -> ResetResult<()> {
    pulse_with(device, signals, || hold_until(hold, interrupt))
}

fn pulse_with<F>(device: &mut dyn ModemControl, signals: SignalSet, hold: F) -> ResetResult<()>
where
    F: FnOnce() -> ResetResult<()>,
{
    if signals.is_empty() {
        return Err(ResetError::Configuration(
            "No control signals selected for reset pulse".to_string(),
        ));
    }

    device.assert_signals(signals)?;

    let held = hold();

    // Runs whatever happened during the hold. A failed release wins over an
    // interrupted hold since a line may still be asserted.
    device.deassert_signals(signals)?;

    held
}

fn hold_until(hold: Duration, interrupt: &AtomicBool) -> ResetResult<()> {
    let poll = Duration::from_micros(HOLD_POLL_INTERVAL_MICROS);
    let start = Instant::now();
    // None when the hold does not fit in an Instant, then only the interrupt ends it
    let deadline = start.checked_add(hold);

    loop {
        if interrupt.load(Ordering::Acquire) {
            return Err(ResetError::TimingInterrupted {
                elapsed: start.elapsed(),
                requested: hold,
            });
        }

        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(());
                }
                poll.min(deadline - now)
            }
            None => poll,
        };
        std::thread::sleep(slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::ControlSignal;

    /// Logs writes, failing every write listed in `fail_on`
    #[derive(Default)]
    struct Recorder {
        writes: Vec<(ControlSignal, bool)>,
        fail_on: Vec<(ControlSignal, bool)>,
    }

    impl ModemControl for Recorder {
        fn write_signal(&mut self, signal: ControlSignal, asserted: bool) -> ResetResult<()> {
            if self.fail_on.contains(&(signal, asserted)) {
                return Err(ResetError::Device(format!("{} stuck", signal)));
            }
            self.writes.push((signal, asserted));
            Ok(())
        }
    }

    #[test]
    fn test_write_order() {
        let mut device = Recorder::default();
        pulse_reset(&mut device, SignalSet::BOTH, Duration::ZERO).unwrap();

        assert_eq!(
            device.writes,
            vec![
                (ControlSignal::RequestToSend, true),
                (ControlSignal::DataTerminalReady, true),
                (ControlSignal::RequestToSend, false),
                (ControlSignal::DataTerminalReady, false),
            ]
        );
    }

    #[test]
    fn test_empty_set_touches_nothing() {
        let mut device = Recorder::default();
        let result = pulse_reset(&mut device, SignalSet::empty(), Duration::ZERO);

        assert!(matches!(result, Err(ResetError::Configuration(_))));
        assert!(device.writes.is_empty());
    }

    #[test]
    fn test_partial_assert_is_rolled_back() {
        let mut device = Recorder {
            fail_on: vec![(ControlSignal::DataTerminalReady, true)],
            ..Default::default()
        };
        let result = pulse_reset(&mut device, SignalSet::BOTH, Duration::from_secs(5));

        assert!(matches!(result, Err(ResetError::Device(_))));
        assert_eq!(
            device.writes,
            vec![
                (ControlSignal::RequestToSend, true),
                (ControlSignal::RequestToSend, false),
            ]
        );
    }

    #[test]
    fn test_release_failure_still_releases_other_lines() {
        let mut device = Recorder {
            fail_on: vec![(ControlSignal::RequestToSend, false)],
            ..Default::default()
        };
        let result = pulse_reset(&mut device, SignalSet::BOTH, Duration::ZERO);

        assert!(matches!(result, Err(ResetError::Device(_))));
        assert_eq!(
            device.writes.last(),
            Some(&(ControlSignal::DataTerminalReady, false))
        );
    }

    #[test]
    fn test_release_failure_wins_over_interrupt() {
        let mut device = Recorder {
            fail_on: vec![(ControlSignal::DataTerminalReady, false)],
            ..Default::default()
        };
        let interrupt = AtomicBool::new(true);
        let result = pulse_reset_interruptible(
            &mut device,
            SignalSet::DTR,
            Duration::from_secs(5),
            &interrupt,
        );

        assert!(matches!(result, Err(ResetError::Device(_))));
    }

    #[test]
    fn test_hold_until_runs_full_duration() {
        let interrupt = AtomicBool::new(false);
        let hold = Duration::from_millis(20);
        let start = Instant::now();

        hold_until(hold, &interrupt).unwrap();
        assert!(start.elapsed() >= hold);
    }

    #[test]
    fn test_failed_rollback_is_reported() {
        let mut device = Recorder {
            fail_on: vec![
                (ControlSignal::DataTerminalReady, true),
                (ControlSignal::RequestToSend, false),
            ],
            ..Default::default()
        };
        let result = pulse_reset(&mut device, SignalSet::BOTH, Duration::from_secs(5));

        match result {
            Err(ResetError::Device(msg)) => {
                assert!(msg.contains("DTR stuck"), "{}", msg);
                assert!(msg.contains("RTS may still be asserted"), "{}", msg);
            }
            other => panic!("expected device error, got {:?}", other),
        }
        assert_eq!(device.writes, vec![(ControlSignal::RequestToSend, true)]);
    }

    #[test]
    fn test_raised_flag_interrupts_zero_hold() {
        let mut device = Recorder::default();
        let interrupt = AtomicBool::new(true);
        let result =
            pulse_reset_interruptible(&mut device, SignalSet::BOTH, Duration::ZERO, &interrupt);

        assert!(matches!(
            result,
            Err(ResetError::TimingInterrupted { requested, .. }) if requested == Duration::ZERO
        ));
        assert_eq!(
            device.writes[2..],
            [
                (ControlSignal::RequestToSend, false),
                (ControlSignal::DataTerminalReady, false),
            ]
        );
    }

    #[test]
    fn test_unbounded_hold_releases_on_interrupt() {
        let mut device = Recorder::default();
        let interrupt = AtomicBool::new(true);
        let result =
            pulse_reset_interruptible(&mut device, SignalSet::BOTH, Duration::MAX, &interrupt);

        assert!(matches!(
            result,
            Err(ResetError::TimingInterrupted { requested, .. }) if requested == Duration::MAX
        ));
        assert_eq!(
            device.writes,
            vec![
                (ControlSignal::RequestToSend, true),
                (ControlSignal::DataTerminalReady, true),
                (ControlSignal::RequestToSend, false),
                (ControlSignal::DataTerminalReady, false),
            ]
        );
    }
}
