//! Conversion between attribute text and numbers.
//!
//! Number lists (`pcoefs`, `kls`, `poles`, ...) accept whitespace or commas as
//! separators and may be wrapped in `()` or `[]`, so both `1 2 3` and
//! `(1.0, 2.0, 3.0)` read the same. Lists are written space separated.

use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// A value that could not be read from attribute text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("`{0}` is not a finite number")]
    Number(String),

    #[error("`{0}` is not an integer")]
    Integer(String),

    #[error("list entry `{entry}` is not a number")]
    ListEntry { entry: String },
}

/// Read a finite real number.
pub fn parse_f64(text: &str) -> Result<f64, ValueError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValueError::Number(text.to_string()))
}

/// Read an integer.
pub fn parse_i64(text: &str) -> Result<i64, ValueError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValueError::Integer(text.to_string()))
}

fn list_entries(text: &str) -> impl Iterator<Item = &str> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .or_else(|| {
            trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
        })
        .unwrap_or(trimmed);

    inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
}

fn parse_list<T: FromStr>(text: &str) -> Result<Vec<T>, ValueError> {
    list_entries(text)
        .map(|entry| {
            entry.parse::<T>().map_err(|_| ValueError::ListEntry {
                entry: entry.to_string(),
            })
        })
        .collect()
}

pub fn parse_f64_list(text: &str) -> Result<Vec<f64>, ValueError> {
    let values = parse_list::<f64>(text)?;
    match values.iter().find(|value| !value.is_finite()) {
        Some(value) => Err(ValueError::ListEntry {
            entry: value.to_string(),
        }),
        None => Ok(values),
    }
}

pub fn parse_i64_list(text: &str) -> Result<Vec<i64>, ValueError> {
    parse_list(text)
}

/// Write a list space separated, using each value's shortest exact form.
pub fn format_list<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_parse_f64() {
        assert_approx_eq!(f64, parse_f64(" 0.25 ").unwrap(), 0.25);
        assert_approx_eq!(f64, parse_f64("-1e-3").unwrap(), -0.001);
        assert_eq!(
            parse_f64("abc"),
            Err(ValueError::Number("abc".to_string()))
        );
        assert!(parse_f64("NaN").is_err());
        assert!(parse_f64("inf").is_err());
        assert!(parse_f64("").is_err());
    }

    #[test]
    fn test_parse_i64() {
        assert_eq!(parse_i64("3"), Ok(3));
        assert_eq!(parse_i64(" -2"), Ok(-2));
        assert_eq!(parse_i64("2.0"), Err(ValueError::Integer("2.0".to_string())));
    }

    #[test]
    fn test_list_separators_and_brackets() {
        assert_eq!(parse_f64_list("1 2.5  3").unwrap(), vec![1.0, 2.5, 3.0]);
        assert_eq!(parse_f64_list("(1.0, 2.0,3)").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(parse_i64_list("[2, 3]").unwrap(), vec![2, 3]);
        assert_eq!(parse_i64_list("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_f64_list("()").unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_list_bad_entry() {
        assert_eq!(
            parse_f64_list("1.0, x, 3"),
            Err(ValueError::ListEntry {
                entry: "x".to_string()
            })
        );
        assert!(parse_i64_list("1 2.5").is_err());
        assert!(parse_f64_list("1 nan").is_err());
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[0.1, 2.0, -3.5]), "0.1 2 -3.5");
        assert_eq!(format_list::<i64>(&[]), "");
    }

    #[test]
    fn test_format_list_reads_back_exactly() {
        let values = vec![0.1 + 0.2, 1.0 / 3.0, 6.02e23];
        assert_eq!(parse_f64_list(&format_list(&values)).unwrap(), values);
    }
}
