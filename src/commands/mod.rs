//! Command surface: chat-message parsing and dispatch.
//!
//! The parser turns a raw chat line into a structured `Command`; the
//! dispatcher resolves it against the registry and produces replies.
//! Non-commands and resolution misses are silent no-ops; the bot
//! observes a shared channel with plenty of unrelated chatter.

mod dispatcher;
mod parser;

pub use dispatcher::{Dispatcher, Reply};
pub use parser::{parse, Command, LookupTarget};
