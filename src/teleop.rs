//! Teleoperation session: the read loop and its state

use std::io::{self, Write};

use log::{debug, warn};

use crate::command::{map_byte, Action, Effect, ScaleFactors, Twist};
use crate::error::Error;
use crate::publish::Publisher;
use crate::signal::Signal;
use crate::terminal::{Event, Terminal};

/// Reason a session ended without error
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Shutdown {
    /// A shutdown signal was received.
    Signal(Signal),
    /// The input device reached end of file.
    EndOfInput,
}

/// Application context for a teleoperation session
///
/// Owns the mutable scale factors, the publish sink and the stream status
/// lines are written to. All state lives here; the read loop borrows the
/// terminal only for the duration of [`run`].
///
/// [`run`]: #method.run
pub struct Teleop<P, W> {
    scales: ScaleFactors,
    publisher: P,
    status: W,
    publish_on_scale: bool,
}

impl<P: Publisher, W: Write> Teleop<P, W> {
    /// Creates a session publishing to `publisher` and writing status lines
    /// to `status`.
    pub fn new(scales: ScaleFactors, publisher: P, status: W) -> Teleop<P, W> {
        Teleop{
            scales,
            publisher,
            status,
            publish_on_scale: false,
        }
    }

    /// Sets whether a scale change also publishes a zero command.
    pub fn publish_on_scale(mut self, enable: bool) -> Teleop<P, W> {
        self.publish_on_scale = enable;
        self
    }

    /// Returns the current scale factors.
    pub fn scales(&self) -> ScaleFactors {
        self.scales
    }

    /// Returns a reference to the publish sink.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Writes the startup banner.
    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.status, "Reading from keyboard")?;
        writeln!(self.status, "---------------------------")?;
        writeln!(self.status, "Use arrow keys to change speed, w/s/a/d/q/e to move, space to stop.")?;
        self.status.flush()
    }

    /// Handles a single input byte.
    ///
    /// Returns the command published for this byte, if any. Unrecognized
    /// bytes publish nothing.
    pub fn handle_byte(&mut self, byte: u8) -> Option<Twist> {
        debug!("value: 0x{:02X}", byte);

        let (action, effect) = map_byte(byte, &mut self.scales)?;

        debug!("{}", action);
        self.report(action, &effect);

        let twist = match effect {
            Effect::Command(twist) => twist,
            Effect::Scaled(_) if self.publish_on_scale => Twist::zero(),
            Effect::Scaled(_) => return None
        };

        if let Err(e) = self.publisher.publish(&twist) {
            warn!("failed to publish {:?}: {}", twist, e);
        }

        Some(twist)
    }

    /// Reads and handles input until a shutdown signal or end of input.
    ///
    /// The terminal must already be prepared; restoring it is left to the
    /// caller, whatever the outcome.
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<Shutdown, Error> {
        loop {
            match terminal.read_byte().map_err(Error::Read)? {
                Event::Byte(byte) => { self.handle_byte(byte); }
                Event::Signal(sig) => return Ok(Shutdown::Signal(sig)),
                Event::Eof => return Ok(Shutdown::EndOfInput),
            }
        }
    }

    fn report(&mut self, action: Action, effect: &Effect) {
        let r = match (action, effect) {
            (Action::Stop, _) => writeln!(self.status, "{}", action),
            (_, Effect::Scaled(scale)) => writeln!(self.status, "{}: {}", action, scale),
            (Action::CurveLeft, Effect::Command(t)) |
            (Action::CurveRight, Effect::Command(t)) =>
                writeln!(self.status, "{}: v: {} w: {}", action, t.linear.x, t.angular.z),
            (Action::RotateLeft, Effect::Command(t)) |
            (Action::RotateRight, Effect::Command(t)) =>
                writeln!(self.status, "{}: {}", action, t.angular.z),
            (_, Effect::Command(t)) => writeln!(self.status, "{}: {}", action, t.linear.x),
        };

        if let Err(e) = r.and_then(|()| self.status.flush()) {
            debug!("failed to write status: {}", e);
        }
    }
}
