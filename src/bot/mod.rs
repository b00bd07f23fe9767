// src/bot/mod.rs

//! User-facing command layer.

pub mod commands;

pub use commands::{Command, respond};
