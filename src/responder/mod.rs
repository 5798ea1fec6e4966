//! Message formatting.
//!
//! Turns dispatcher results into chat-ready text: inline lookup lines,
//! rich verbose attachments and monospace tables. All currency and
//! number rendering funnels through the helpers in `format` so every
//! message agrees on locale conventions.

pub mod format;
mod message;
mod table;

pub use message::{help_text, inline_message, verbose_attachment};
pub use table::AsciiTable;
