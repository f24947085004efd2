//! homework-bot — reports homework review status changes to Telegram.
//!
//! Polls the homework statuses API on a fixed interval, interprets the latest
//! submission, and sends the student a chat message for every poll result.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod homework;
pub mod logging;
pub mod notifier;
pub mod poller;
