//! Segcat - Virtual concatenation of media segments
//!
//! This library crate exposes configuration loading and timeline reports for
//! the `segcat` binary and for integration testing.

pub mod config;
pub mod report;
