pub use self::terminal::{PrepareState, Terminal};

mod terminal;
