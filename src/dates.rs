// 📅 Date Helpers
// Reformatting of ISO date strings and generation of consecutive day sequences

use crate::error::{FeeError, Result};
use chrono::{Days, NaiveDate};

/// Pattern every helper input is parsed with (YYYY-MM-DD)
pub const INPUT_PATTERN: &str = "%Y-%m-%d";

/// Human-readable output pattern: "25 Jan 2001"
pub const DISPLAY_PATTERN: &str = "%d %b %Y";

/// Parse `value` with a chrono pattern, mapping any failure to `FeeError::Format`
pub fn parse_date(value: &str, pattern: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), pattern).map_err(|_| FeeError::format(value, pattern))
}

/// Re-emit each `YYYY-MM-DD` string as `DD Mon YYYY`
///
/// Order and length are preserved. The first string that does not parse
/// aborts the whole call.
///
/// # Example:
/// ```
/// let out = library_fees::reformat_dates(&["2021-01-02"]).unwrap();
/// assert_eq!(out, vec!["02 Jan 2021".to_string()]);
/// ```
pub fn reformat_dates<S: AsRef<str>>(dates: &[S]) -> Result<Vec<String>> {
    dates
        .iter()
        .map(|raw| {
            let date = parse_date(raw.as_ref(), INPUT_PATTERN)?;
            Ok(date.format(DISPLAY_PATTERN).to_string())
        })
        .collect()
}

/// `n` consecutive calendar days beginning at `start` (inclusive)
pub fn date_range(start: &str, n: usize) -> Result<Vec<NaiveDate>> {
    let start_date = parse_date(start, INPUT_PATTERN)?;

    if n > 0 {
        let last_offset = Days::new(n as u64 - 1);
        if start_date.checked_add_days(last_offset).is_none() {
            return Err(FeeError::validation(
                "n",
                format!("{} days from {} runs past the last supported date", n, start),
            ));
        }
    }

    Ok(start_date.iter_days().take(n).collect())
}

/// Pair every value with a day, starting at `start_date` and advancing one day per value
pub fn add_date_range<I, V>(values: I, start_date: &str) -> Result<Vec<(NaiveDate, V)>>
where
    I: IntoIterator<Item = V>,
    I::IntoIter: ExactSizeIterator,
{
    let values = values.into_iter();
    let days = date_range(start_date, values.len())?;
    Ok(days.into_iter().zip(values).collect())
}

/// Validate a day count given as text: must be a non-negative whole number
pub fn parse_count(raw: &str) -> Result<usize> {
    let trimmed = raw.trim();

    if let Ok(n) = trimmed.parse::<usize>() {
        return Ok(n);
    }

    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(FeeError::validation(
            "n",
            format!("must be non-negative, got {}", n),
        )),
        _ => Err(FeeError::validation(
            "n",
            format!("must be a whole number, got '{}'", raw),
        )),
    }
}
