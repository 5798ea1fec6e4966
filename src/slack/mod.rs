//! Slack boundary: outbound Web API client, inbound RTM socket and the
//! liveness watchdog.
//!
//! Everything here treats Slack as a send/receive boundary. Delivery
//! guarantees, retries and channel semantics belong to the platform;
//! the bot only filters inbound events and posts replies.

mod client;
mod events;
mod rtm;
mod watchdog;

pub use client::{AttachmentField, MessageAttachment, PostOptions, SlackClient, SlackError};
pub use events::InboundEvent;
pub use rtm::RtmSocket;
pub use watchdog::{Watchdog, DEFAULT_TIMEOUT as DEFAULT_WATCHDOG_TIMEOUT};
