//! Utilities shared by the hiroba binaries and library crates.

pub mod logger;
pub mod time;
