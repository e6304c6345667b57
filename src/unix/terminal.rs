use std::convert::TryFrom;
use std::fs::File;
use std::io;
use std::os::unix::io::{FromRawFd, IntoRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use libc::{c_int, STDIN_FILENO};

use nix::errno::Errno;
use nix::sys::select::{pselect, FdSet};
use nix::sys::signal::{
    pthread_sigmask, sigaction,
    SaFlags, SigAction, SigHandler, Signal as NixSignal, SigSet, SigmaskHow,
};
use nix::sys::termios::{
    tcgetattr, tcsetattr,
    LocalFlags, SetArg, Termios,
};
use nix::unistd::read;

use crate::signal::{Signal, SignalSet};
use crate::terminal::{Event, PrepareConfig};

pub struct Terminal {
    in_fd: RawFd,
    owned_fd: bool,
    reader: Reader,
}

struct Reader {
    report_signals: SignalSet,
    // Signal mask applied while waiting for input; shutdown signals are
    // blocked everywhere else so they can only interrupt the wait.
    wait_mask: Option<SigSet>,
}

pub struct PrepareState {
    old_tio: Termios,
    old_actions: Vec<(NixSignal, SigAction)>,
    old_mask: Option<SigSet>,
    prev_report: SignalSet,
    prev_wait_mask: Option<SigSet>,
}

impl Terminal {
    fn new(in_fd: RawFd, owned_fd: bool) -> Terminal {
        Terminal{
            in_fd,
            owned_fd,
            reader: Reader{
                report_signals: SignalSet::new(),
                wait_mask: None,
            },
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Terminal> {
        let fd = open_rw(path)?;
        Ok(Terminal::new(fd, true))
    }

    pub fn stdin() -> io::Result<Terminal> {
        Ok(Terminal::new(STDIN_FILENO, false))
    }

    pub fn prepare(&mut self, config: PrepareConfig) -> io::Result<PrepareState> {
        use nix::sys::termios::SpecialCharacterIndices::*;

        let old_tio = tcgetattr(self.in_fd).map_err(nix_to_io)?;
        let mut tio = old_tio.clone();

        // Disable canonical mode, delivering input without waiting for
        // newline or EOF, and disable ECHO.
        tio.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);

        // ISIG, when enabled, causes the process to receive signals when
        // Ctrl-C, Ctrl-\, etc. are input
        if config.block_signals {
            tio.local_flags.remove(LocalFlags::ISIG);
        } else {
            tio.local_flags.insert(LocalFlags::ISIG);
        }

        tio.control_chars[VMIN as usize] = config.min_bytes;
        tio.control_chars[VTIME as usize] = config.timeout_deciseconds;

        tcsetattr(self.in_fd, SetArg::TCSANOW, &tio).map_err(nix_to_io)?;

        let mut state = PrepareState{
            old_tio,
            old_actions: Vec::new(),
            old_mask: None,
            prev_report: self.reader.report_signals,
            prev_wait_mask: self.reader.wait_mask,
        };

        if let Err(e) = self.install_handlers(config.report_signals, &mut state) {
            // Leave the terminal as it was found
            let _ = self.restore(state);
            return Err(e);
        }

        Ok(state)
    }

    fn install_handlers(&mut self, signals: SignalSet, state: &mut PrepareState)
            -> io::Result<()> {
        if signals.is_empty() {
            return Ok(());
        }

        let action = SigAction::new(SigHandler::Handler(handle_signal),
            SaFlags::empty(), SigSet::all());

        let mut block = SigSet::empty();

        for sig in signals.iter() {
            let nix_sig = to_nix_signal(sig);
            let old = unsafe { sigaction(nix_sig, &action).map_err(nix_to_io)? };

            state.old_actions.push((nix_sig, old));
            block.add(nix_sig);
        }

        let mut old_mask = SigSet::empty();
        pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&block), Some(&mut old_mask))
            .map_err(nix_to_io)?;

        state.old_mask = Some(old_mask);

        self.reader.report_signals = signals;
        self.reader.wait_mask = Some(old_mask);

        Ok(())
    }

    pub fn restore(&mut self, state: PrepareState) -> io::Result<()> {
        self.reader.report_signals = state.prev_report;
        self.reader.wait_mask = state.prev_wait_mask;

        // Signal state is handed back even if the device rejects the
        // attributes, e.g. after a hangup.
        let res = tcsetattr(self.in_fd, SetArg::TCSANOW, &state.old_tio).map_err(nix_to_io);

        // Unblock before handing the signals back, so that anything still
        // pending lands in our handler rather than a default action.
        if let Some(ref mask) = state.old_mask {
            pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(mask), None)
                .map_err(nix_to_io)?;
        }

        for (sig, old) in state.old_actions.iter().rev() {
            unsafe { sigaction(*sig, old).map_err(nix_to_io)?; }
        }

        res
    }

    pub fn read_byte(&mut self) -> io::Result<Event> {
        let mut buf = [0; 1];

        loop {
            // Check for a signal that may have already arrived.
            if let Some(sig) = take_signal() {
                if self.reader.report_signals.contains(sig) {
                    return Ok(Event::Signal(sig));
                }
            }

            if !self.wait_input()? {
                continue;
            }

            match read(self.in_fd, &mut buf) {
                Ok(0) => return Ok(Event::Eof),
                Ok(_) => return Ok(Event::Byte(buf[0])),
                Err(Errno::EINTR) => (),
                Err(e) => return Err(nix_to_io(e))
            }
        }
    }

    /// Returns `Ok(false)` if the wait was interrupted by a signal.
    fn wait_input(&self) -> io::Result<bool> {
        let in_fd = self.in_fd;

        let mut r_fds = FdSet::new();
        r_fds.insert(in_fd);

        let mut e_fds = FdSet::new();
        e_fds.insert(in_fd);

        match pselect(in_fd + 1,
                Some(&mut r_fds), None, Some(&mut e_fds),
                None, self.reader.wait_mask.as_ref()) {
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(nix_to_io(e))
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.owned_fd {
            unsafe { close_fd(self.in_fd); }
        }
    }
}

unsafe fn close_fd(fd: RawFd) {
    drop(File::from_raw_fd(fd));
}

fn open_rw<P: AsRef<Path>>(path: P) -> io::Result<RawFd> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;

    // Never adopt the device as controlling terminal; a hangup on it
    // would otherwise kill the process before the terminal is restored.
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)?;

    Ok(file.into_raw_fd())
}

fn nix_to_io(e: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

static LAST_SIGNAL: AtomicUsize = AtomicUsize::new(0);

extern "C" fn handle_signal(signum: c_int) {
    LAST_SIGNAL.store(signum as usize, Ordering::Relaxed);
}

fn to_nix_signal(sig: Signal) -> NixSignal {
    match sig {
        Signal::Hangup    => NixSignal::SIGHUP,
        Signal::Interrupt => NixSignal::SIGINT,
        Signal::Quit      => NixSignal::SIGQUIT,
        Signal::Terminate => NixSignal::SIGTERM,
    }
}

fn conv_signal(sig: c_int) -> Option<Signal> {
    match NixSignal::try_from(sig).ok() {
        Some(NixSignal::SIGHUP)  => Some(Signal::Hangup),
        Some(NixSignal::SIGINT)  => Some(Signal::Interrupt),
        Some(NixSignal::SIGQUIT) => Some(Signal::Quit),
        Some(NixSignal::SIGTERM) => Some(Signal::Terminate),
        _ => None
    }
}

fn take_signal() -> Option<Signal> {
    conv_signal(LAST_SIGNAL.swap(0, Ordering::Relaxed) as c_int)
}
