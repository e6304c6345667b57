//! Contains types relating to operating system signals

use std::fmt;
use std::iter::FromIterator;
use std::ops;

/// Signal that ends a teleoperation session
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Signal {
    /// Hangup signal (`SIGHUP`); the controlling terminal went away
    Hangup,
    /// Interrupt signal (`SIGINT`), usually Ctrl-C
    Interrupt,
    /// Quit signal (`SIGQUIT`), usually Ctrl-\
    Quit,
    /// Termination request (`SIGTERM`)
    Terminate,
}

const NUM_SIGNALS: u8 = 4;

const SIGNALS: &[Signal] = &[
    Signal::Hangup,
    Signal::Interrupt,
    Signal::Quit,
    Signal::Terminate,
];

impl Signal {
    fn as_bit(&self) -> u8 {
        1 << (*self as u8)
    }

    fn all_bits() -> u8 {
        (1 << NUM_SIGNALS) - 1
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Signal::Hangup => "SIGHUP",
            Signal::Interrupt => "SIGINT",
            Signal::Quit => "SIGQUIT",
            Signal::Terminate => "SIGTERM",
        })
    }
}

impl ops::BitOr for Signal {
    type Output = SignalSet;

    fn bitor(self, rhs: Signal) -> SignalSet {
        let mut set = SignalSet::new();

        set.insert(self);
        set.insert(rhs);
        set
    }
}

/// Represents a set of `Signal` values
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct SignalSet(u8);

impl SignalSet {
    /// Returns an empty `SignalSet`.
    pub fn new() -> SignalSet {
        SignalSet(0)
    }

    /// Returns a `SignalSet` containing all available signals.
    pub fn all() -> SignalSet {
        SignalSet(Signal::all_bits())
    }

    /// Returns whether this set contains the given `Signal`.
    pub fn contains(&self, sig: Signal) -> bool {
        self.0 & sig.as_bit() != 0
    }

    /// Returns whether this set contains any signals.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Inserts a `Signal` into this set.
    pub fn insert(&mut self, sig: Signal) {
        self.0 |= sig.as_bit();
    }

    /// Removes a `Signal` from this set.
    pub fn remove(&mut self, sig: Signal) {
        self.0 &= !sig.as_bit();
    }

    /// Returns the union of two sets.
    ///
    /// This is equivalent to `self | other`.
    pub fn union(&self, other: SignalSet) -> SignalSet {
        SignalSet(self.0 | other.0)
    }

    /// Returns an iterator over the signals contained in this set.
    pub fn iter(&self) -> impl Iterator<Item=Signal> {
        let set = *self;
        SIGNALS.iter().cloned().filter(move |&sig| set.contains(sig))
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;

        f.write_str("SignalSet(")?;

        for sig in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }

            write!(f, "{:?}", sig)?;
            first = false;
        }

        f.write_str(")")
    }
}

impl From<Signal> for SignalSet {
    fn from(sig: Signal) -> SignalSet {
        let mut set = SignalSet::new();
        set.insert(sig);
        set
    }
}

impl Extend<Signal> for SignalSet {
    fn extend<I: IntoIterator<Item=Signal>>(&mut self, iter: I) {
        for sig in iter {
            self.insert(sig);
        }
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item=Signal>>(iter: I) -> SignalSet {
        let mut set = SignalSet::new();

        set.extend(iter);
        set
    }
}

impl ops::BitOr for SignalSet {
    type Output = SignalSet;

    fn bitor(self, rhs: SignalSet) -> SignalSet {
        self.union(rhs)
    }
}

impl ops::BitOr<Signal> for SignalSet {
    type Output = SignalSet;

    fn bitor(self, rhs: Signal) -> SignalSet {
        self.union(rhs.into())
    }
}

impl ops::BitOrAssign<Signal> for SignalSet {
    fn bitor_assign(&mut self, rhs: Signal) {
        self.insert(rhs);
    }
}
