//! Custom commands
//!
//! Text arriving from the speech worker is either one of ours (`press`,
//! `tapkey`, `holdkey`, `releasekey`, `sleep`, `switchwindow`) or something
//! the host runs itself. The dispatcher tells them apart, the executor runs
//! ours.

mod dispatcher;
mod executor;
mod registry;
pub mod tokenizer;

pub use dispatcher::{CommandDispatcher, Dispatch};
pub use executor::CommandExecutor;
pub use registry::{Action, CommandRegistry, Invocation};
pub use tokenizer::{action_name, parse_millis, tokenize};
