//! Topic board library.
//!
//! A small link-sharing system: a chat-command front end registers topics
//! (title + URL + optional image/description), a thin mediation HTTP API
//! persists them in SQLite, and a public page lists the active ones.
//!
//! The chat-platform gateway itself is not part of this crate; the [`bot`]
//! module exposes the command lifecycle behind a dispatch adapter trait.

pub mod bot;
pub mod config;
pub mod db;
pub mod links;
pub mod web;
