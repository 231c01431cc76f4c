// 📚 Return Records
// One parsed input row: who returned what, when it was due, when it came back

use crate::dates::parse_date;
use crate::error::{FeeError, Result};
use crate::schema::ReportSchema;
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A single book return, materialised only while the input is being read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRecord {
    pub patron_id: String,
    pub due_date: NaiveDate,
    pub return_date: NaiveDate,
    /// Present when the schema reads the rate from each record
    pub fee_per_day: Option<Decimal>,
}

impl ReturnRecord {
    /// Whole calendar days between due and return; negative when returned early
    pub fn days_late(&self) -> i64 {
        (self.return_date - self.due_date).num_days()
    }

    /// Fee owed for this return, `None` when it was not late or costs nothing
    ///
    /// `fixed_rate` is used when the record carries no rate of its own.
    /// A fee too large for `Decimal` fails on `line`, blaming `rate_field`.
    pub fn late_fee(
        &self,
        fixed_rate: Decimal,
        line: u64,
        rate_field: &str,
    ) -> Result<Option<Decimal>> {
        let days = self.days_late();
        if days <= 0 {
            return Ok(None);
        }
        let rate = self.fee_per_day.unwrap_or(fixed_rate);
        let fee = rate
            .checked_mul(Decimal::from(days))
            .ok_or_else(|| FeeError::data_format(line, rate_field, "fee overflows"))?;
        Ok((fee > Decimal::ZERO).then_some(fee))
    }
}

/// Column positions of the schema's fields inside one particular input header
#[derive(Debug, Clone)]
pub struct RecordLayout {
    patron: Column,
    due: DateColumn,
    returned: DateColumn,
    rate: Option<Column>,
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    index: usize,
}

#[derive(Debug, Clone)]
struct DateColumn {
    column: Column,
    pattern: String,
}

impl RecordLayout {
    /// Resolve every required field against the header row
    ///
    /// A field the header does not name fails on line 1.
    pub fn from_headers(schema: &ReportSchema, headers: &StringRecord) -> Result<Self> {
        let columns = schema
            .required_fields()
            .into_iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|h| h.trim() == name)
                    .map(|index| Column {
                        name: name.to_string(),
                        index,
                    })
                    .ok_or_else(|| FeeError::data_format(1, name, "column missing from header"))
            })
            .collect::<Result<Vec<Column>>>()?;

        let (patron, due, returned, rate) = match columns.as_slice() {
            [patron, due, returned] => (patron, due, returned, None),
            [patron, due, returned, rate] => (patron, due, returned, Some(rate.clone())),
            _ => {
                return Err(FeeError::validation(
                    "schema",
                    format!("unexpected field list: {:?}", schema.required_fields()),
                ))
            }
        };

        Ok(RecordLayout {
            patron: patron.clone(),
            due: DateColumn {
                column: due.clone(),
                pattern: schema.due_pattern.clone(),
            },
            returned: DateColumn {
                column: returned.clone(),
                pattern: schema.returned_pattern.clone(),
            },
            rate,
        })
    }

    /// Field blamed when a fee cannot be computed
    pub fn rate_field(&self) -> &str {
        match &self.rate {
            Some(column) => &column.name,
            None => "fee_rate",
        }
    }

    /// Parse one data row found on `line` of the input
    pub fn parse(&self, record: &StringRecord, line: u64) -> Result<ReturnRecord> {
        let patron_id = field(record, &self.patron, line)?.to_string();
        if patron_id.is_empty() {
            return Err(FeeError::data_format(line, &self.patron.name, "empty patron id"));
        }

        let due_date = self.due.parse(record, line)?;
        let return_date = self.returned.parse(record, line)?;

        let fee_per_day = match &self.rate {
            Some(column) => Some(parse_rate(field(record, column, line)?, &column.name, line)?),
            None => None,
        };

        Ok(ReturnRecord {
            patron_id,
            due_date,
            return_date,
            fee_per_day,
        })
    }
}

impl DateColumn {
    fn parse(&self, record: &StringRecord, line: u64) -> Result<NaiveDate> {
        let raw = field(record, &self.column, line)?;
        parse_date(raw, &self.pattern).map_err(|err| {
            FeeError::data_format(line, &self.column.name, err.to_string())
        })
    }
}

fn field<'r>(record: &'r StringRecord, column: &Column, line: u64) -> Result<&'r str> {
    record
        .get(column.index)
        .map(str::trim)
        .ok_or_else(|| FeeError::data_format(line, &column.name, "missing value"))
}

fn parse_rate(raw: &str, name: &str, line: u64) -> Result<Decimal> {
    let rate = Decimal::from_str(raw)
        .map_err(|_| FeeError::data_format(line, name, format!("not a number: '{}'", raw)))?;

    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(FeeError::data_format(
            line,
            name,
            format!("negative rate: {}", rate),
        ));
    }

    Ok(rate)
}

// ============================================================================
// TESTS
// ============================================================================
