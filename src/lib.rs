// src/lib.rs

//! ffwatch: a polled cache of Free Fire game data.
//!
//! A background poller scrapes the official site (with an API fallback),
//! fingerprints the content, and keeps an in-memory snapshot that command
//! handlers read without blocking on the network.

pub mod bot;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod services;
pub mod utils;
