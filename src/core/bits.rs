//! Bit-pattern helpers shared by construction and decoding.
//!
//! Every pattern in this crate is written most-significant-first: for a
//! register (or control list) of width `w`, character `j` of the pattern is the
//! value of wire `w - 1 - j`. Wire `i` therefore carries weight `2^i` and the
//! pattern read as a binary literal is the register's unsigned value.

use super::error::{Result, WalkError};

/// Checks that `pattern` contains only `'0'` and `'1'`.
pub fn validate_bitstring(pattern: &str) -> Result<()> {
    if let Some(bad) = pattern.chars().find(|c| *c != '0' && *c != '1') {
        return Err(WalkError::config(format!(
            "bitstring '{}' contains non-binary character '{}'",
            pattern, bad
        )));
    }
    Ok(())
}

/// Checks the pattern is binary and exactly `width` characters long.
pub fn validate_width(pattern: &str, width: usize, what: &str) -> Result<()> {
    validate_bitstring(pattern)?;
    if pattern.len() != width {
        return Err(WalkError::config(format!(
            "{} '{}' has length {} but {} bits are required",
            what,
            pattern,
            pattern.len(),
            width
        )));
    }
    Ok(())
}

/// The all-ones pattern of width `n`.
pub fn ones(n: usize) -> String {
    "1".repeat(n)
}

/// The all-zeros pattern of width `n`.
pub fn zeros(n: usize) -> String {
    "0".repeat(n)
}

/// Converts a pattern into per-wire values: `bits[i]` is the value of wire `i`.
pub fn wire_bits(pattern: &str) -> Vec<bool> {
    pattern.chars().rev().map(|c| c == '1').collect()
}

/// Formats the low `width` bits of `value` most-significant-first.
pub fn to_bitstring(value: u64, width: usize) -> String {
    (0..width)
        .rev()
        .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Interprets a pattern as an unsigned binary integer.
pub fn parse_unsigned(pattern: &str) -> Result<u64> {
    validate_bitstring(pattern)?;
    if pattern.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(pattern, 2)
        .map_err(|e| WalkError::config(format!("bitstring '{}' is not a u64: {}", pattern, e)))
}

fn flip(c: char) -> char {
    if c == '1' { '0' } else { '1' }
}

/// Cyclically increments a pattern by one (`"111"` wraps to `"000"`).
pub fn binary_step_up(pattern: &str) -> String {
    let mut bits: Vec<char> = pattern.chars().collect();
    // ripple from the least significant end; flip until the first zero is set
    for c in bits.iter_mut().rev() {
        let was_one = *c == '1';
        *c = flip(*c);
        if !was_one {
            break;
        }
    }
    bits.into_iter().collect()
}

/// Cyclically decrements a pattern by one (`"000"` wraps to `"111"`).
pub fn binary_step_down(pattern: &str) -> String {
    let mut bits: Vec<char> = pattern.chars().collect();
    for c in bits.iter_mut().rev() {
        let was_zero = *c == '0';
        *c = flip(*c);
        if !was_zero {
            break;
        }
    }
    bits.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bits_are_lsb_first() {
        assert_eq!(wire_bits("011"), vec![true, true, false]);
        assert_eq!(wire_bits(""), Vec::<bool>::new());
    }

    #[test]
    fn test_to_bitstring_round_trips_through_parse() -> Result<()> {
        assert_eq!(to_bitstring(3, 3), "011");
        assert_eq!(parse_unsigned("011")?, 3);
        assert_eq!(parse_unsigned("")?, 0);
        Ok(())
    }

    #[test]
    fn test_step_up_and_down_wrap() {
        assert_eq!(binary_step_up("011"), "100");
        assert_eq!(binary_step_up("111"), "000");
        assert_eq!(binary_step_down("000"), "111");
        assert_eq!(binary_step_down("100"), "011");
    }

    #[test]
    fn test_validate_width_rejects_mismatch() {
        assert!(validate_width("0101", 4, "boundary").is_ok());
        assert!(matches!(
            validate_width("010", 4, "boundary"),
            Err(WalkError::Configuration { .. })
        ));
        assert!(validate_bitstring("01x").is_err());
    }
}
