//! Numeric literal parsing.
//!
//! The scanner is permissive about which bytes belong to a number; the
//! text is validated here. Integers are tried first, then floats, then
//! exact fractions.

use super::TokenKind;
use crate::ast::Rational;

/// Why a numeric literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    /// The text is not a number.
    Invalid,
    /// The value does not fit the supported range.
    OutOfRange,
}

/// Parses the text of a numeric literal.
///
/// `float` is set by the scanner when the text contains a `.` or a
/// signed exponent, which skips the integer attempt.
pub fn parse_number(text: &str, float: bool) -> Result<TokenKind, NumberError> {
    if !float {
        if let Some(value) = parse_integer(text) {
            return Ok(TokenKind::Integer(value));
        }
    }
    if let Ok(value) = text.parse::<f64>() {
        if value.is_finite() {
            return Ok(TokenKind::Float(value));
        }
    }
    parse_rational(text).map(TokenKind::Rational)
}

fn split_sign(text: &str) -> (bool, &str) {
    text.strip_prefix('-')
        .map_or((false, text), |rest| (true, rest))
}

fn split_radix(text: &str) -> (u32, &str) {
    let bytes = text.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &text[2..]),
            b'o' | b'O' => return (8, &text[2..]),
            b'b' | b'B' => return (2, &text[2..]),
            _ => {}
        }
    }
    (10, text)
}

fn all_digits(text: &str, radix: u32) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_digit(radix))
}

fn parse_integer(text: &str) -> Option<i64> {
    let (negative, body) = split_sign(text);
    let (radix, digits) = split_radix(body);
    if !all_digits(digits, radix) {
        return None;
    }
    let magnitude = i128::try_from(u128::from_str_radix(digits, radix).ok()?).ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

const fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

fn pow10(exp: u32) -> Result<i128, NumberError> {
    10_i128.checked_pow(exp).ok_or(NumberError::OutOfRange)
}

/// Parses an exact decimal `[-]digits[.digits][e[+-]digits]`, or a
/// radix-prefixed integer, into a reduced fraction.
fn parse_rational(text: &str) -> Result<Rational, NumberError> {
    let (negative, body) = split_sign(text);
    let (radix, digits) = split_radix(body);
    if radix != 10 {
        // a well-formed prefixed integer only gets here when it overflowed
        return Err(if all_digits(digits, radix) {
            NumberError::OutOfRange
        } else {
            NumberError::Invalid
        });
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let exponent: i64 = match exponent {
        None => 0,
        Some(exp) => {
            let (exp_negative, exp_digits) = match exp.as_bytes().first() {
                Some(b'-') => (true, &exp[1..]),
                Some(b'+') => (false, &exp[1..]),
                _ => (false, exp),
            };
            if !all_digits(exp_digits, 10) {
                return Err(NumberError::Invalid);
            }
            let value: i64 = exp_digits.parse().map_err(|_| NumberError::OutOfRange)?;
            if exp_negative {
                -value
            } else {
                value
            }
        }
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (whole.is_empty() && fraction.is_empty())
        || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(NumberError::Invalid);
    }

    let mut num: i128 = 0;
    for b in whole.bytes().chain(fraction.bytes()) {
        num = num
            .checked_mul(10)
            .and_then(|n| n.checked_add(i128::from(b - b'0')))
            .ok_or(NumberError::OutOfRange)?;
    }
    if num == 0 {
        return Ok(Rational { num: 0, den: 1 });
    }

    let fraction_len = i64::try_from(fraction.len()).map_err(|_| NumberError::OutOfRange)?;
    let scale = exponent
        .checked_sub(fraction_len)
        .ok_or(NumberError::OutOfRange)?;
    let shift = u32::try_from(scale.unsigned_abs()).map_err(|_| NumberError::OutOfRange)?;
    let mut den: i128 = 1;
    if scale >= 0 {
        num = num
            .checked_mul(pow10(shift)?)
            .ok_or(NumberError::OutOfRange)?;
    } else {
        den = pow10(shift)?;
    }

    let divisor = gcd(num, den);
    let num = i64::try_from(num / divisor).map_err(|_| NumberError::OutOfRange)?;
    let den = i64::try_from(den / divisor).map_err(|_| NumberError::OutOfRange)?;
    Ok(Rational {
        num: if negative { -num } else { num },
        den,
    })
}
