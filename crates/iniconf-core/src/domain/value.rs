//! Textual scalar values.
//!
//! Every configuration value is kept in the form it has in the file: a short
//! UTF-8 string.  [`ScalarValue`] owns that string and converts it to and
//! from native scalars on demand.
//!
//! # Encoding rules
//!
//! | Native type              | Text                                         |
//! |--------------------------|----------------------------------------------|
//! | `&str`, `String`, `char` | stored verbatim                              |
//! | `i32`, `i64`             | base-10, leading `-` for negatives           |
//! | `u32`, `u64`             | base-10                                      |
//! | `f64`                    | fixed-point with exactly `precision` digits  |
//! | `bool`                   | `true` / `false`                             |
//!
//! Decoding is deliberately asymmetric.  Numbers are parsed leniently (see
//! `numeric`), so a hand-edited `42 # retries` still yields `42`.  Booleans
//! are strict: only the exact text `true` is true; `True`, `1` and `yes` are
//! all false.
//!
//! # Capacity
//!
//! The text buffer grows in 16-byte steps and never beyond [`MAX_CAPACITY`]
//! bytes.  An assignment that would need more space, or whose allocation
//! fails, empties the value and returns a [`ValueError`].

use std::fmt;

use thiserror::Error;
use tracing::error;

use super::numeric;

/// Digits after the decimal point used when rendering `f64` values.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest buffer a value may allocate, in bytes.
pub const MAX_CAPACITY: usize = u16::MAX as usize;

/// Characters of the rejected text included in the growth-failure log line.
const LOG_PREVIEW_CHARS: usize = 10;

/// Error type for value assignments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The rendered text is too long for any permitted buffer size.
    #[error("value of {requested} bytes exceeds the maximum capacity of {max} bytes")]
    CapacityExceeded { requested: usize, max: usize },

    /// The allocator could not provide the buffer.
    #[error("could not allocate {requested} bytes for value")]
    AllocationFailed { requested: usize },
}

// ── Scalar ────────────────────────────────────────────────────────────────────

/// A native scalar on its way into a [`ScalarValue`].
///
/// Every supported Rust type converts into `Scalar` with `From`, so APIs can
/// accept `impl Into<Scalar>` and callers can pass plain literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    /// A double.  `precision` is only honoured when a new [`ScalarValue`] is
    /// constructed from it; assignment keeps the target's precision.
    Double { value: f64, precision: Option<u32> },
    Bool(bool),
}

impl Scalar {
    /// A double rendered with `precision` fractional digits.
    pub fn double(value: f64, precision: u32) -> Self {
        Scalar::Double {
            value,
            precision: Some(precision),
        }
    }

    /// Renders the canonical text, using `precision` for doubles.
    pub fn render(&self, precision: u32) -> String {
        match self {
            Scalar::Text(text) => text.clone(),
            Scalar::Int32(v) => v.to_string(),
            Scalar::UInt32(v) => v.to_string(),
            Scalar::Int64(v) => v.to_string(),
            Scalar::UInt64(v) => v.to_string(),
            Scalar::Double { value, .. } => format!("{:.*}", precision as usize, value),
            Scalar::Bool(true) => "true".to_string(),
            Scalar::Bool(false) => "false".to_string(),
        }
    }

    /// Returns `true` when `stored` already holds this value.
    ///
    /// Integers and booleans compare after decoding `stored` with the matching
    /// accessor, so `007` matches `7`.  Text compares verbatim; doubles compare
    /// by the text they would render to.
    pub fn matches(&self, stored: &ScalarValue) -> bool {
        match self {
            Scalar::Text(text) => stored.raw_text() == text,
            Scalar::Int32(v) => stored.as_i32() == *v,
            Scalar::UInt32(v) => stored.as_u32() == *v,
            Scalar::Int64(v) => stored.as_i64() == *v,
            Scalar::UInt64(v) => stored.as_u64() == *v,
            Scalar::Double { precision, .. } => {
                let precision = precision.unwrap_or(stored.precision());
                stored.raw_text() == self.render(precision)
            }
            Scalar::Bool(v) => stored.as_bool() == *v,
        }
    }

    fn construction_precision(&self) -> u32 {
        match self {
            Scalar::Double {
                precision: Some(p), ..
            } => *p,
            _ => DEFAULT_PRECISION,
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&String> for Scalar {
    fn from(v: &String) -> Self {
        Scalar::Text(v.clone())
    }
}

impl From<char> for Scalar {
    fn from(v: char) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int32(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::UInt32(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int64(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt64(v)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Double {
            value,
            precision: None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

// ── ScalarValue ───────────────────────────────────────────────────────────────

/// One configuration value, stored as text.
///
/// Two values are equal when their text is equal: `1.004` and `1.001` stored
/// with precision 2 both render as `1.00` and compare equal.
///
/// # Examples
///
/// ```rust
/// use iniconf_core::{Scalar, ScalarValue};
///
/// let port = ScalarValue::new(24800u32);
/// assert_eq!(port.raw_text(), "24800");
/// assert_eq!(port.as_u32(), 24800);
///
/// let scale = ScalarValue::new(Scalar::double(1.23456, 3));
/// assert_eq!(scale.raw_text(), "1.235");
/// ```
#[derive(Debug, Clone)]
pub struct ScalarValue {
    text: String,
    /// Allocated size granted by the growth policy; always greater than `text.len()`
    /// unless the value is invalidated (both zero).
    capacity: usize,
    precision: u32,
}

impl ScalarValue {
    /// Creates a value from any supported scalar.
    ///
    /// Doubles built with [`Scalar::double`] fix the value's precision; every
    /// other input uses [`DEFAULT_PRECISION`].  If the text cannot be stored
    /// the value is empty and the failure has been logged.
    pub fn new(value: impl Into<Scalar>) -> Self {
        let scalar = value.into();
        let mut v = Self::empty(scalar.construction_precision());
        // Failure leaves the value empty and has already been logged.
        let _ = v.assign(scalar);
        v
    }

    /// Creates an empty value that renders doubles with `precision` digits.
    pub fn empty(precision: u32) -> Self {
        Self {
            text: String::new(),
            capacity: 0,
            precision,
        }
    }

    /// Re-encodes the value from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the buffer cannot grow to hold the new
    /// text.  The value is left empty in that case.
    pub fn assign(&mut self, value: impl Into<Scalar>) -> Result<(), ValueError> {
        let rendered = value.into().render(self.precision);
        self.store_text(&rendered)
    }

    /// The stored text.
    pub fn raw_text(&self) -> &str {
        &self.text
    }

    pub fn as_string(&self) -> String {
        self.text.clone()
    }

    pub fn as_i32(&self) -> i32 {
        numeric::parse_i32(&self.text)
    }

    pub fn as_u32(&self) -> u32 {
        numeric::parse_u32(&self.text)
    }

    pub fn as_i64(&self) -> i64 {
        numeric::parse_i64(&self.text)
    }

    pub fn as_u64(&self) -> u64 {
        numeric::parse_u64(&self.text)
    }

    pub fn as_f64(&self) -> f64 {
        numeric::parse_f64(&self.text)
    }

    /// `true` only for the exact text `true`.
    pub fn as_bool(&self) -> bool {
        self.text == "true"
    }

    /// Digits after the decimal point used when a double is assigned.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes currently granted to the buffer by the growth policy.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn store_text(&mut self, text: &str) -> Result<(), ValueError> {
        if let Err(err) = self.reserve(text.len()) {
            let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
            error!("failed to store value {preview:?}: {err}");
            self.invalidate();
            return Err(err);
        }
        self.text.clear();
        self.text.push_str(text);
        Ok(())
    }

    /// Makes room for `len` bytes, growing to the next 16-byte step.
    fn reserve(&mut self, len: usize) -> Result<(), ValueError> {
        if len < self.capacity {
            return Ok(());
        }
        let size = len.saturating_add(16) & !0xF;
        if size > MAX_CAPACITY {
            return Err(ValueError::CapacityExceeded {
                requested: len,
                max: MAX_CAPACITY,
            });
        }
        self.text
            .try_reserve_exact(size - self.text.len())
            .map_err(|_| ValueError::AllocationFailed { requested: size })?;
        self.capacity = size;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.text = String::new();
        self.capacity = 0;
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        Self::empty(DEFAULT_PRECISION)
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ScalarValue {}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

macro_rules! scalar_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(v: $ty) -> Self {
                    Self::new(v)
                }
            }
        )*
    };
}

scalar_value_from!(&str, String, &String, char, i32, u32, i64, u64, f64, bool, Scalar);

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Encoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_integers_render_base_ten() {
        assert_eq!(ScalarValue::new(0i32).raw_text(), "0");
        assert_eq!(ScalarValue::new(-42i32).raw_text(), "-42");
        assert_eq!(ScalarValue::new(u32::MAX).raw_text(), "4294967295");
        assert_eq!(ScalarValue::new(i64::MIN).raw_text(), "-9223372036854775808");
        assert_eq!(ScalarValue::new(u64::MAX).raw_text(), "18446744073709551615");
    }

    #[test]
    fn test_double_renders_with_default_precision() {
        let v = ScalarValue::new(3.14159);
        assert_eq!(v.raw_text(), "3.14");
        assert_eq!(v.precision(), DEFAULT_PRECISION);
    }

    #[test]
    fn test_double_renders_fixed_point_not_scientific() {
        assert_eq!(ScalarValue::new(1.0e7).raw_text(), "10000000.00");
        assert_eq!(ScalarValue::new(0.0001).raw_text(), "0.00");
    }

    #[test]
    fn test_double_with_explicit_precision() {
        assert_eq!(ScalarValue::new(Scalar::double(2.0, 0)).raw_text(), "2");
        assert_eq!(ScalarValue::new(Scalar::double(1.5, 4)).raw_text(), "1.5000");
    }

    #[test]
    fn test_bool_renders_literal_tokens() {
        assert_eq!(ScalarValue::new(true).raw_text(), "true");
        assert_eq!(ScalarValue::new(false).raw_text(), "false");
    }

    #[test]
    fn test_char_renders_single_character() {
        assert_eq!(ScalarValue::new('/').raw_text(), "/");
    }

    // ── Decoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_integer_round_trips() {
        for v in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(ScalarValue::new(v).as_i32(), v);
        }
        for v in [0u32, 1, u32::MAX] {
            assert_eq!(ScalarValue::new(v).as_u32(), v);
        }
        for v in [i64::MIN, -1, 0, i64::MAX] {
            assert_eq!(ScalarValue::new(v).as_i64(), v);
        }
        for v in [0u64, 1, u64::MAX] {
            assert_eq!(ScalarValue::new(v).as_u64(), v);
        }
    }

    #[test]
    fn test_double_round_trips_within_precision() {
        let v = ScalarValue::new(-12.345_678);
        assert!((v.as_f64() - -12.35).abs() < 1e-9);

        let v = ScalarValue::new(Scalar::double(0.125, 3));
        assert_eq!(v.as_f64(), 0.125);
    }

    #[test]
    fn test_bool_decoding_is_exact_match() {
        assert!(ScalarValue::new("true").as_bool());
        for text in ["True", "TRUE", "1", "yes", "", " true"] {
            assert!(!ScalarValue::new(text).as_bool(), "{text:?} must decode to false");
        }
    }

    #[test]
    fn test_numeric_decoding_is_permissive() {
        let v = ScalarValue::new("250ms");
        assert_eq!(v.as_i32(), 250);
        assert_eq!(v.as_u64(), 250);
        assert_eq!(v.as_f64(), 250.0);
        assert_eq!(ScalarValue::new("abc").as_i64(), 0);
    }

    // ── Assignment ────────────────────────────────────────────────────────────

    #[test]
    fn test_assign_re_encodes_from_scratch() {
        // Arrange
        let mut v = ScalarValue::new("a rather long piece of text");

        // Act
        v.assign(7i32).unwrap();

        // Assert
        assert_eq!(v.raw_text(), "7");
    }

    #[test]
    fn test_assign_double_keeps_construction_precision() {
        // Arrange
        let mut v = ScalarValue::new(Scalar::double(1.0, 3));

        // Act – the precision carried by the scalar is ignored on assignment
        v.assign(Scalar::double(2.5, 0)).unwrap();

        // Assert
        assert_eq!(v.raw_text(), "2.500");
    }

    #[test]
    fn test_capacity_grows_in_sixteen_byte_steps() {
        let mut v = ScalarValue::default();
        assert_eq!(v.capacity(), 0);

        v.assign("abc").unwrap();
        assert_eq!(v.capacity(), 16);

        v.assign("x".repeat(16)).unwrap();
        assert_eq!(v.capacity(), 32);

        // Shrinking text keeps the buffer.
        v.assign("y").unwrap();
        assert_eq!(v.capacity(), 32);
        assert!(v.len() < v.capacity());
    }

    #[test]
    fn test_largest_value_below_cap_is_accepted() {
        let text = "z".repeat(65_519);
        let v = ScalarValue::new(text.as_str());
        assert_eq!(v.len(), 65_519);
        assert!(v.capacity() <= MAX_CAPACITY);
    }

    #[test]
    fn test_oversized_assignment_empties_value_and_reports_error() {
        // Arrange
        let mut v = ScalarValue::new("kept until now");

        // Act
        let result = v.assign("z".repeat(65_520));

        // Assert
        assert_eq!(
            result,
            Err(ValueError::CapacityExceeded {
                requested: 65_520,
                max: MAX_CAPACITY
            })
        );
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn test_value_is_usable_after_failed_assignment() {
        let mut v = ScalarValue::default();
        assert!(v.assign("z".repeat(100_000)).is_err());

        v.assign(12u32).unwrap();
        assert_eq!(v.as_u32(), 12);
    }

    // ── Equality ──────────────────────────────────────────────────────────────

    #[test]
    fn test_equality_is_by_encoded_text() {
        assert_eq!(ScalarValue::new(1.004), ScalarValue::new(1.001));
        assert_eq!(ScalarValue::new(5i32), ScalarValue::new("5"));
        assert_ne!(ScalarValue::new(5i32), ScalarValue::new("05"));
    }

    #[test]
    fn test_scalar_matches_uses_typed_comparison() {
        let stored = ScalarValue::new("007");
        assert!(Scalar::from(7i32).matches(&stored));
        assert!(!Scalar::from("7").matches(&stored));

        let stored = ScalarValue::new(1.004);
        assert!(Scalar::from(1.001).matches(&stored));
        assert!(!Scalar::from(1.01).matches(&stored));

        let stored = ScalarValue::new("yes");
        assert!(Scalar::from(false).matches(&stored));
    }

    #[test]
    fn test_display_prints_raw_text() {
        assert_eq!(ScalarValue::new(-3i64).to_string(), "-3");
    }
}
