//! Time bases, rescaling, and the duration syntax.
//!
//! Every position on a virtual timeline is expressed on the common clock,
//! [`TIME_BASE_Q`] (microseconds). Packets and per-segment seeks use each
//! stream's own [`Rational`] time base, so values are moved between the two
//! with the rescale functions here. Rounding is always explicit.

use std::fmt;

use crate::{Error, Result};

/// Ticks per second of the common clock.
pub const TIME_BASE: i64 = 1_000_000;

/// The common clock as a time base (1/1000000 s).
pub const TIME_BASE_Q: Rational = Rational::new(1, 1_000_000);

/// A rational number, used for time bases, frame rates and aspect ratios.
///
/// A zero numerator stands for "unknown" where a value is optional
/// (frame rates, sample aspect ratios).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational {
    /// Numerator.
    pub num: i32,
    /// Denominator.
    pub den: i32,
}

impl Rational {
    /// Create a new rational.
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Returns true if both parts are strictly positive.
    ///
    /// Only such values are usable as time bases.
    pub const fn is_positive(self) -> bool {
        self.num > 0 && self.den > 0
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Rounding applied when a rescaled value is not an exact integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round toward zero.
    Zero,
    /// Round away from zero.
    Inf,
    /// Round toward negative infinity.
    Down,
    /// Round toward positive infinity.
    Up,
    /// Round to nearest, halfway cases away from zero.
    #[default]
    NearInf,
}

/// Compute `a * b / c` with the given rounding, without intermediate overflow.
///
/// A zero divisor or a result outside `i64` saturates.
pub fn rescale_rnd(a: i64, b: i64, c: i64, rnd: Rounding) -> i64 {
    let (mut r, mut c) = (a as i128 * b as i128, c as i128);
    if c < 0 {
        r = -r;
        c = -c;
    }
    if c == 0 {
        return match r.signum() {
            0 => 0,
            1 => i64::MAX,
            _ => i64::MIN,
        };
    }

    let q = match rnd {
        Rounding::Zero => r / c,
        Rounding::Inf if r >= 0 => (r + c - 1) / c,
        Rounding::Inf => (r - c + 1) / c,
        Rounding::Down => r.div_euclid(c),
        Rounding::Up => -(-r).div_euclid(c),
        Rounding::NearInf if r >= 0 => (r + c / 2) / c,
        Rounding::NearInf => (r - c / 2) / c,
    };

    q.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Rescale `a` from time base `from` to time base `to` with explicit rounding.
pub fn rescale_q_rnd(a: i64, from: Rational, to: Rational, rnd: Rounding) -> i64 {
    let b = from.num as i64 * to.den as i64;
    let c = to.num as i64 * from.den as i64;
    rescale_rnd(a, b, c, rnd)
}

/// Rescale `a` from time base `from` to time base `to`, rounding to nearest.
pub fn rescale_q(a: i64, from: Rational, to: Rational) -> i64 {
    rescale_q_rnd(a, from, to, Rounding::NearInf)
}

/// Like [`rescale_q_rnd`], but `i64::MIN` and `i64::MAX` are open bounds and
/// pass through unchanged.
pub fn rescale_bound(a: i64, from: Rational, to: Rational, rnd: Rounding) -> i64 {
    if a == i64::MIN || a == i64::MAX {
        a
    } else {
        rescale_q_rnd(a, from, to, rnd)
    }
}

/// A `[min, target, max]` timestamp window.
///
/// `i64::MIN` / `i64::MAX` bounds mean "unbounded" and survive every
/// transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekWindow {
    /// Earliest acceptable position.
    pub min: i64,
    /// Requested position.
    pub target: i64,
    /// Latest acceptable position.
    pub max: i64,
}

impl SeekWindow {
    /// Create a window from explicit bounds.
    pub const fn new(min: i64, target: i64, max: i64) -> Self {
        Self { min, target, max }
    }

    /// An unbounded window around `target`.
    pub const fn at(target: i64) -> Self {
        Self::new(i64::MIN, target, i64::MAX)
    }

    /// Rescale the window between time bases.
    ///
    /// The lower bound rounds up and the upper bound rounds down, so the
    /// result never covers more than the input did.
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self {
            min: rescale_bound(self.min, from, to, Rounding::Up),
            target: rescale_q(self.target, from, to),
            max: rescale_bound(self.max, from, to, Rounding::Down),
        }
    }

    /// Move the window `offset` ticks earlier, keeping open bounds open.
    pub fn shift_back(self, offset: i64) -> Self {
        let shift = |v: i64| {
            if v == i64::MIN || v == i64::MAX {
                v
            } else {
                v.saturating_sub(offset)
            }
        };
        Self {
            min: shift(self.min),
            target: self.target.saturating_sub(offset),
            max: shift(self.max),
        }
    }
}

/// Parse a time value into microseconds.
///
/// Accepted syntax: an optional `-`, then `[HH:]MM:SS` or plain seconds,
/// an optional `.fraction` (six digits significant), and an optional unit
/// suffix of `s`, `ms` or `us`.
///
/// # Examples
///
/// ```
/// use segcat_common::time::parse_duration;
///
/// assert_eq!(parse_duration("20.5").unwrap(), 20_500_000);
/// assert_eq!(parse_duration("01:02:03").unwrap(), 3_723_000_000);
/// assert_eq!(parse_duration("250ms").unwrap(), 250_000);
/// assert!(parse_duration("ten").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<i64> {
    let invalid = || Error::invalid_duration(value);
    let bytes = value.as_bytes();

    let negative = bytes.first() == Some(&b'-');
    let pos = usize::from(negative);

    let (mut seconds, mut pos) = parse_clock(bytes, pos)
        .or_else(|| take_number(bytes, pos, 19))
        .ok_or_else(invalid)?;

    let mut micros: i64 = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let mut weight = 100_000;
        while let Some(d) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
            micros += weight * i64::from(d - b'0');
            weight /= 10;
            pos += 1;
        }
    }

    let mut scale = TIME_BASE;
    match &bytes[pos..] {
        [b'm', b's', ..] => {
            scale = 1_000;
            micros /= 1_000;
            pos += 2;
        }
        [b'u', b's', ..] => {
            scale = 1;
            micros = 0;
            pos += 2;
        }
        [b's', ..] => pos += 1,
        _ => {}
    }

    if pos != bytes.len() {
        return Err(invalid());
    }

    seconds = seconds
        .checked_mul(scale)
        .and_then(|t| t.checked_add(micros))
        .ok_or_else(invalid)?;

    Ok(if negative { -seconds } else { seconds })
}

/// Parse `HH:MM:SS` or `MM:SS` starting at `pos`, returning whole seconds.
fn parse_clock(bytes: &[u8], pos: usize) -> Option<(i64, usize)> {
    let hms = || {
        let (hours, p) = take_number(bytes, pos, 10)?;
        let p = expect(bytes, p, b':')?;
        let (minutes, p) = take_sexagesimal(bytes, p)?;
        let p = expect(bytes, p, b':')?;
        let (secs, p) = take_sexagesimal(bytes, p)?;
        Some((hours * 3600 + minutes * 60 + secs, p))
    };
    let ms = || {
        let (minutes, p) = take_sexagesimal(bytes, pos)?;
        let p = expect(bytes, p, b':')?;
        let (secs, p) = take_sexagesimal(bytes, p)?;
        Some((minutes * 60 + secs, p))
    };
    hms().or_else(ms)
}

fn expect(bytes: &[u8], pos: usize, byte: u8) -> Option<usize> {
    (bytes.get(pos) == Some(&byte)).then_some(pos + 1)
}

/// One or two digits in `0..=59`.
fn take_sexagesimal(bytes: &[u8], pos: usize) -> Option<(i64, usize)> {
    take_number(bytes, pos, 2).filter(|(v, _)| *v <= 59)
}

/// Between one and `max_len` ASCII digits.
fn take_number(bytes: &[u8], pos: usize, max_len: usize) -> Option<(i64, usize)> {
    let len = bytes[pos.min(bytes.len())..]
        .iter()
        .take(max_len)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let value = std::str::from_utf8(&bytes[pos..pos + len])
        .ok()?
        .parse::<i64>()
        .ok()?;
    Some((value, pos + len))
}

/// Format a common-clock value as `[-]HH:MM:SS.ffffff`.
pub fn format_timestamp(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let secs = abs / TIME_BASE as u64;
    format!(
        "{}{:02}:{:02}:{:02}.{:06}",
        sign,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        abs % TIME_BASE as u64
    )
}
