//! Provides an interface to the terminal device read by the teleop loop

use std::io;
use std::path::Path;

use crate::signal::{Signal, SignalSet};
use crate::sys;

/// An event read from the terminal
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A single byte of raw input
    Byte(u8),
    /// A signal included in `PrepareConfig::report_signals` was received
    Signal(Signal),
    /// The input device reported end of file
    Eof,
}

/// Configures a [`Terminal`] to read raw input.
///
/// [`Terminal`]: struct.Terminal.html
#[derive(Copy, Clone, Debug)]
pub struct PrepareConfig {
    /// Whether to block signals that result from user input.
    ///
    /// If `true`, Ctrl-C is read as the byte `0x03` instead of generating
    /// `Signal(Interrupt)`.
    ///
    /// The default is `false`.
    pub block_signals: bool,
    /// Minimum number of bytes a raw read waits for (`VMIN`).
    ///
    /// The default is `1`.
    pub min_bytes: u8,
    /// Inter-byte timeout of a raw read, in deciseconds (`VTIME`).
    ///
    /// The default is `0`, waiting indefinitely.
    pub timeout_deciseconds: u8,
    /// For each signal in the set, a signal handler will intercept the signal
    /// and report it by returning an `Event::Signal(_)` value.
    ///
    /// By default, all signals are reported.
    pub report_signals: SignalSet,
}

impl Default for PrepareConfig {
    fn default() -> PrepareConfig {
        PrepareConfig{
            block_signals: false,
            min_bytes: 1,
            timeout_deciseconds: 0,
            report_signals: SignalSet::all(),
        }
    }
}

/// Holds the terminal configuration captured by [`Terminal::prepare`].
///
/// The value must be passed to [`Terminal::restore`] to return the terminal
/// to its original mode. Because `restore` consumes it, the original mode is
/// re-applied at most once.
///
/// [`Terminal::prepare`]: struct.Terminal.html#method.prepare
/// [`Terminal::restore`]: struct.Terminal.html#method.restore
#[must_use = "the terminal stays in raw mode until this value is restored"]
pub struct PrepareState(sys::PrepareState);

/// Reads raw input from a terminal device
///
/// A `Terminal` starts out untouched. [`prepare`] switches it into raw mode
/// with echo and line buffering disabled, after which [`read_byte`] yields
/// one byte at a time. [`restore`] returns the device to the mode captured
/// by `prepare`.
///
/// [`prepare`]: #method.prepare
/// [`read_byte`]: #method.read_byte
/// [`restore`]: #method.restore
pub struct Terminal(pub(crate) sys::Terminal);

impl Terminal {
    /// Opens an interface to the terminal on `stdin`.
    pub fn stdin() -> io::Result<Terminal> {
        Ok(Terminal(sys::Terminal::stdin()?))
    }

    /// Opens an interface to the terminal device at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Terminal> {
        Ok(Terminal(sys::Terminal::open(path)?))
    }

    /// Prepares the terminal to read raw input.
    ///
    /// When reading operations have concluded, [`restore`] should be called
    /// with the resulting `PrepareState` value to restore the terminal to
    /// its previous state.
    ///
    /// See [`PrepareConfig`] for details.
    ///
    /// [`PrepareConfig`]: struct.PrepareConfig.html
    /// [`restore`]: #method.restore
    pub fn prepare(&mut self, config: PrepareConfig) -> io::Result<PrepareState> {
        self.0.prepare(config).map(PrepareState)
    }

    /// Restores the terminal to its previous state.
    pub fn restore(&mut self, state: PrepareState) -> io::Result<()> {
        self.0.restore(state.0)
    }

    /// Blocks until a byte of input or a reported signal arrives.
    ///
    /// Signals that arrive before this method is called are reported by
    /// the next call.
    pub fn read_byte(&mut self) -> io::Result<Event> {
        self.0.read_byte()
    }
}
