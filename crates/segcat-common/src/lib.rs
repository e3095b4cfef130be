//! Segcat-Common: Shared time primitives and location utilities.
//!
//! This crate provides common functionality used across segcat:
//!
//! - **Time**: Rational time bases, rescaling with explicit rounding, the
//!   microsecond common clock, and duration parsing/formatting
//! - **Path Utilities**: Absolute location resolution and the safe-filename rule
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use segcat_common::time::{parse_duration, rescale_q, Rational, TIME_BASE_Q};
//! use segcat_common::paths::is_safe_location;
//!
//! // Ten seconds on the common clock
//! let ten = parse_duration("10.0").unwrap();
//! assert_eq!(ten, 10_000_000);
//!
//! // The same span in a 90 kHz stream time base
//! assert_eq!(rescale_q(ten, TIME_BASE_Q, Rational::new(1, 90_000)), 900_000);
//!
//! assert!(is_safe_location("sub/dir/clip.ts"));
//! ```

pub mod error;
pub mod paths;
pub mod time;

pub use error::{Error, Result};
pub use time::{Rational, Rounding, TIME_BASE, TIME_BASE_Q};
