// src/lib.rs

//! Packman Package Index
//!
//! A networked registry of packages and their direct dependencies.
//! Clients send `INDEX`, `REMOVE` and `QUERY` commands, one per line, and
//! get back `OK`, `FAIL` or `ERROR`.
//!
//! # Architecture
//!
//! - Protocol: pure decoding of `VERB|NAME|DEPS` lines into commands
//! - Index: in-memory map that refuses unknown dependencies and dangling removals
//! - Processor: one global lock, so commands apply in a single total order
//! - Server: thread per connection, all sharing one processor

pub mod client;
pub mod config;
mod error;
pub mod index;
pub mod processor;
pub mod protocol;
pub mod server;

pub use error::{Error, Result};
