//! Permissive prefix parsing for scalar decoding.
//!
//! Values read from a hand-edited file are decoded leniently: leading
//! whitespace is skipped, one sign is accepted, and parsing stops at the first
//! character that cannot continue the number (`"42px"` decodes to `42`).  Text
//! with no numeric prefix decodes to zero.  These are the rules of the C
//! `strtol` family, made total: out-of-range magnitudes saturate instead of
//! being undefined.

/// Whitespace as classified by C `isspace` in the "C" locale.
pub(crate) fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

struct IntegerPrefix {
    negative: bool,
    magnitude: u64,
    overflowed: bool,
}

fn integer_prefix(text: &str) -> Option<IntegerPrefix> {
    let bytes = text.trim_start_matches(is_c_space).as_bytes();

    let mut i = 0;
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        negative = sign == b'-';
        i = 1;
    }

    let digits_start = i;
    let mut magnitude: u64 = 0;
    let mut overflowed = false;
    while let Some(&b) = bytes.get(i) {
        if !b.is_ascii_digit() {
            break;
        }
        match magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u64::from(b - b'0')))
        {
            Some(m) => magnitude = m,
            None => overflowed = true,
        }
        i += 1;
    }

    if i == digits_start {
        return None;
    }
    Some(IntegerPrefix {
        negative,
        magnitude,
        overflowed,
    })
}

pub(crate) fn parse_i64(text: &str) -> i64 {
    let Some(p) = integer_prefix(text) else {
        return 0;
    };
    let limit = i64::MAX as u64;
    if p.negative {
        if p.overflowed || p.magnitude > limit + 1 {
            i64::MIN
        } else {
            // 2^63 casts to i64::MIN, whose negation wraps back onto itself.
            (p.magnitude as i64).wrapping_neg()
        }
    } else if p.overflowed || p.magnitude > limit {
        i64::MAX
    } else {
        p.magnitude as i64
    }
}

pub(crate) fn parse_i32(text: &str) -> i32 {
    parse_i64(text).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A `-` sign negates in two's complement, the way `strtoull` does.
pub(crate) fn parse_u64(text: &str) -> u64 {
    let Some(p) = integer_prefix(text) else {
        return 0;
    };
    if p.overflowed {
        u64::MAX
    } else if p.negative {
        p.magnitude.wrapping_neg()
    } else {
        p.magnitude
    }
}

pub(crate) fn parse_u32(text: &str) -> u32 {
    let Some(p) = integer_prefix(text) else {
        return 0;
    };
    if p.overflowed || p.magnitude > u64::from(u32::MAX) {
        return u32::MAX;
    }
    let m = p.magnitude as u32;
    if p.negative {
        m.wrapping_neg()
    } else {
        m
    }
}

pub(crate) fn parse_f64(text: &str) -> f64 {
    let s = text.trim_start_matches(is_c_space);
    let bytes = s.as_bytes();

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    // Longest word first so "infinity" is not cut short at "inf".
    for word in ["infinity", "inf", "nan"] {
        let end = i + word.len();
        if bytes.len() >= end && bytes[i..end].eq_ignore_ascii_case(word.as_bytes()) {
            return s[..end].parse().unwrap_or(0.0);
        }
    }

    let mut digits = 0;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
        digits += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        let mut j = i + 1;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
            digits += 1;
        }
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            i = j;
        }
    }

    s[..i].parse().unwrap_or(0.0)
}
