//! Response line parser
//!
//! Pulls numeric tokens out of a sensor line with a greedy left-to-right
//! scan. A token is an optionally signed integer or decimal (`12`, `12.`,
//! `.5`, `-3.25`) with an optional exponent (`1.5e-3`). Exactly one token
//! must be present for the line to yield a reading.

use crate::domain::reading::RawReading;
use crate::error::ParseError;

/// Extract the single temperature value from a response line.
///
/// The value is rounded to 0.1 °C.
pub fn parse_line(line: &str) -> Result<RawReading, ParseError> {
    let tokens = numeric_tokens(line);
    match tokens.as_slice() {
        [] => Err(ParseError::NoValue),
        [token] => token
            .parse::<f64>()
            .ok()
            .and_then(RawReading::new)
            .ok_or(ParseError::NoValue),
        many => Err(ParseError::Ambiguous(many.len())),
    }
}

/// All numeric tokens in `line`, in order of appearance.
pub fn numeric_tokens(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match match_number(bytes, pos) {
            Some(end) => {
                tokens.push(&line[pos..end]);
                pos = end;
            }
            None => pos += 1,
        }
    }

    tokens
}

/// Try to match a number starting exactly at `start`; returns the end index.
fn match_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;

    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(bytes, i);
    i += int_digits;

    if bytes.get(i) == Some(&b'.') {
        let frac_digits = count_digits(bytes, i + 1);
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        i += 1 + frac_digits;
    } else if int_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(bytes, j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    Some(i)
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_line() {
        let reading = parse_line("T= 12.3 'C").unwrap();
        assert_eq!(reading.value(), 12.3);
    }

    #[test]
    fn negative_value_line() {
        let reading = parse_line("T= -7.8 'C").unwrap();
        assert_eq!(reading.value(), -7.8);
    }

    #[test]
    fn value_is_rounded_to_one_decimal() {
        assert_eq!(parse_line("T= 21.06 'C").unwrap().value(), 21.1);
        assert_eq!(parse_line("T= 21.04 'C").unwrap().value(), 21.0);
    }

    #[test]
    fn rounding_follows_the_stored_value() {
        // Stored just below the written decimal
        assert_eq!(parse_line("T= 14.95 'C").unwrap().value(), 14.9);
        assert_eq!(parse_line("T= 24.95 'C").unwrap().value(), 24.9);
        assert_eq!(parse_line("T= 0.35 'C").unwrap().value(), 0.3);
        // Exact tie goes to even
        assert_eq!(parse_line("T= 12.25 'C").unwrap().value(), 12.2);
        assert_eq!(parse_line("T= 12.75 'C").unwrap().value(), 12.8);
        assert_eq!(parse_line("T= -12.25 'C").unwrap().value(), -12.2);
    }

    #[test]
    fn rounded_value_picks_the_lower_band() {
        use crate::domain::calibration::{Band, CalibrationTable};

        let raw = parse_line("T= 14.95 'C").unwrap().value();
        assert_eq!(Band::for_temperature(raw), Band::P10);

        let mut table = CalibrationTable::zero();
        table.set_offset(Band::P10, 0.2);
        table.set_offset(Band::P20, -0.3);
        assert!((table.apply(raw) - 15.1).abs() < 1e-9);
    }

    #[test]
    fn two_values_are_ambiguous() {
        assert_eq!(parse_line("T= 12.3 'C 45"), Err(ParseError::Ambiguous(2)));
    }

    #[test]
    fn no_value_is_rejected() {
        assert_eq!(parse_line("T= ---- 'C"), Err(ParseError::NoValue));
        assert_eq!(parse_line(""), Err(ParseError::NoValue));
    }

    #[test]
    fn token_shapes() {
        assert_eq!(numeric_tokens("a 1 b 12. c .5 d -3.25"), vec!["1", "12.", ".5", "-3.25"]);
        assert_eq!(numeric_tokens("+1.5e-3 2E4"), vec!["+1.5e-3", "2E4"]);
        // A dangling exponent marker is not part of the number
        assert_eq!(numeric_tokens("T= 4e 'C"), vec!["4"]);
        assert!(numeric_tokens("- . +").is_empty());
    }
}
