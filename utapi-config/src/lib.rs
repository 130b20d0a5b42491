//! Configuration for the UTAPI CLI and server.

mod config;

pub use self::config::*;
