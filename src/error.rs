//! Error type for a teleoperation session

use std::io;

use thiserror::Error;

/// Fatal error ending a teleoperation session
#[derive(Debug, Error)]
pub enum Error {
    /// Reading terminal attributes or switching to raw mode failed.
    #[error("failed to prepare terminal: {0}")]
    Setup(#[source] io::Error),
    /// A read from standard input failed.
    #[error("read(): {0}")]
    Read(#[source] io::Error),
    /// Re-applying the original terminal attributes failed.
    #[error("failed to restore terminal: {0}")]
    Restore(#[source] io::Error),
    /// The publish sink could not be opened.
    #[error("failed to open {target} sink for `{topic}`: {source}")]
    Transport {
        /// Topic the sink was opened for
        topic: String,
        /// Configured sink target
        target: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns the process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match *self {
            Error::Read(_) => 1,
            Error::Setup(_) => 3,
            Error::Transport{..} => 4,
            Error::Restore(_) => 5,
        }
    }
}
