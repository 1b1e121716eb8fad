//! Modlinker - Workshop link bot for RimWorld discussions
//!
//! Recognizes natural-language link requests in comments ("linkmod: Colony
//! Manager", "there are 3 B18 mods for that: a, b"), searches the Steam
//! Workshop for each request, renders the results as reddit markdown and packs
//! them into size-limited reply messages.

pub mod bot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod patterns;
pub mod reply;
pub mod request;
pub mod storage;

pub use error::{ModlinkerError, Result};
