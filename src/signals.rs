use std::fmt;

use clap::ValueEnum;

/// Modem-control output lines that can be pulsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ControlSignal {
    /// Request To Send
    #[value(name = "rts", alias = "request-to-send")]
    RequestToSend,

    /// Data Terminal Ready
    #[value(name = "dtr", alias = "data-terminal-ready")]
    DataTerminalReady,
}

impl ControlSignal {
    pub const ALL: [ControlSignal; 2] = [
        ControlSignal::RequestToSend,
        ControlSignal::DataTerminalReady,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ControlSignal::RequestToSend => "RTS",
            ControlSignal::DataTerminalReady => "DTR",
        }
    }

    const fn mask(&self) -> u8 {
        match self {
            ControlSignal::RequestToSend => 0b01,
            ControlSignal::DataTerminalReady => 0b10,
        }
    }

    /// Matching `TIOCM_*` bit for the modem-control ioctls
    #[cfg(unix)]
    pub fn tiocm_bit(&self) -> libc::c_int {
        match self {
            ControlSignal::RequestToSend => libc::TIOCM_RTS,
            ControlSignal::DataTerminalReady => libc::TIOCM_DTR,
        }
    }
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of control lines driven together by one pulse.
///
/// Iteration always yields RTS before DTR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SignalSet(u8);

impl SignalSet {
    pub const RTS: SignalSet = SignalSet(ControlSignal::RequestToSend.mask());
    pub const DTR: SignalSet = SignalSet(ControlSignal::DataTerminalReady.mask());
    pub const BOTH: SignalSet = SignalSet(SignalSet::RTS.0 | SignalSet::DTR.0);

    pub const fn empty() -> Self {
        SignalSet(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(&self, signal: ControlSignal) -> bool {
        self.0 & signal.mask() != 0
    }

    pub fn insert(&mut self, signal: ControlSignal) {
        self.0 |= signal.mask();
    }

    pub fn remove(&mut self, signal: ControlSignal) {
        self.0 &= !signal.mask();
    }

    pub fn iter(&self) -> Signals {
        Signals {
            set: *self,
            next: 0,
        }
    }

    /// OR of the `TIOCM_*` bits of every line in the set
    #[cfg(unix)]
    pub fn tiocm_bits(&self) -> libc::c_int {
        self.iter().fold(0, |bits, signal| bits | signal.tiocm_bit())
    }
}

impl From<ControlSignal> for SignalSet {
    fn from(signal: ControlSignal) -> Self {
        SignalSet(signal.mask())
    }
}

impl FromIterator<ControlSignal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = ControlSignal>>(iter: I) -> Self {
        let mut set = SignalSet::empty();
        for signal in iter {
            set.insert(signal);
        }
        set
    }
}

/// Lines of a [`SignalSet`], RTS first
#[derive(Debug, Clone)]
pub struct Signals {
    set: SignalSet,
    next: usize,
}

impl Iterator for Signals {
    type Item = ControlSignal;

    fn next(&mut self) -> Option<ControlSignal> {
        while let Some(signal) = ControlSignal::ALL.get(self.next).copied() {
            self.next += 1;
            if self.set.contains(signal) {
                return Some(signal);
            }
        }
        None
    }
}

impl IntoIterator for SignalSet {
    type Item = ControlSignal;
    type IntoIter = Signals;

    fn into_iter(self) -> Signals {
        self.iter()
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(|signal| signal.name()).collect();
        f.write_str(&names.join("+"))
    }
}
