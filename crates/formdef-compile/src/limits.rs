//! Range-limit cell parsing.
//!
//! Numeric limits keep integer form when the source cell has no decimal
//! point. Date and time limits stay as authored strings; they are only
//! validated so unparseable cells surface as warnings.

use chrono::{NaiveDate, NaiveTime};

use formdef_model::NumericLimit;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// Parse a numeric limit cell.
pub fn parse_numeric_limit(cell: &str) -> Option<NumericLimit> {
    let trimmed = cell.trim();
    if trimmed.contains('.') {
        trimmed.parse::<f64>().ok().map(NumericLimit::Float)
    } else {
        trimmed.parse::<i64>().ok().map(NumericLimit::Integer)
    }
}

/// Parse an answer-count cell.
pub fn parse_count(cell: &str) -> Option<u32> {
    cell.trim().parse::<u32>().ok()
}

/// Whether a date-limit cell parses under any accepted format.
pub fn date_limit_parses(cell: &str) -> bool {
    let trimmed = cell.trim();
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(trimmed, format).is_ok())
}

/// Whether a time-limit cell parses under any accepted format.
pub fn time_limit_parses(cell: &str) -> bool {
    let trimmed = cell.trim();
    TIME_FORMATS
        .iter()
        .any(|format| NaiveTime::parse_from_str(trimmed, format).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_cells_stay_integral() {
        assert_eq!(parse_numeric_limit("42"), Some(NumericLimit::Integer(42)));
        assert_eq!(parse_numeric_limit("-3"), Some(NumericLimit::Integer(-3)));
        assert_eq!(parse_numeric_limit("2.5"), Some(NumericLimit::Float(2.5)));
        assert_eq!(parse_numeric_limit("abc"), None);
    }

    #[test]
    fn date_limits_validate() {
        assert!(date_limit_parses("2023-01-15"));
        assert!(date_limit_parses("15/01/2023"));
        assert!(!date_limit_parses("sometime"));
    }

    #[test]
    fn time_limits_validate() {
        assert!(time_limit_parses("08:30"));
        assert!(time_limit_parses("08:30:15"));
        assert!(!time_limit_parses("8 o'clock"));
    }
}
