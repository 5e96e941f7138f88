use std::fmt;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering::{Acquire, Release};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Red,
    Green,
}

impl Phase {
    /// The opposite phase. Red and green are the only states.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    pub fn is_green(self) -> bool {
        self == Phase::Green
    }

    const fn to_u8(self) -> u8 {
        match self {
            Phase::Red => 0,
            Phase::Green => 1,
        }
    }

    const fn from_u8(raw: u8) -> Phase {
        match raw {
            0 => Phase::Red,
            _ => Phase::Green,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Red => f.write_str("red"),
            Phase::Green => f.write_str("green"),
        }
    }
}

/// Current phase shared between the cycle thread (sole writer) and readers.
pub(crate) struct AtomicPhase {
    raw: AtomicU8,
}

impl AtomicPhase {
    pub(crate) const fn new(phase: Phase) -> Self {
        Self {
            raw: AtomicU8::new(phase.to_u8()),
        }
    }

    pub(crate) fn load(&self) -> Phase {
        Phase::from_u8(self.raw.load(Acquire))
    }

    pub(crate) fn store(&self, phase: Phase) {
        self.raw.store(phase.to_u8(), Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_between_two_phases() {
        assert_eq!(Phase::default(), Phase::Red);
        assert_eq!(Phase::Red.toggled(), Phase::Green);
        assert_eq!(Phase::Green.toggled(), Phase::Red);
        assert_eq!(Phase::Red.toggled().toggled(), Phase::Red);
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Phase::Red.to_string(), "red");
        assert_eq!(Phase::Green.to_string(), "green");
    }

    #[test]
    fn atomic_phase_holds_last_store() {
        let phase = AtomicPhase::new(Phase::Red);
        assert_eq!(phase.load(), Phase::Red);

        phase.store(Phase::Green);
        assert_eq!(phase.load(), Phase::Green);
        assert!(phase.load().is_green());
    }
}
