// 📐 Report Schemas - Input layouts as data
// Field names, date patterns and fee-rate source for each supported return-record file

use crate::error::{FeeError, Result};
use anyhow::Context as AnyhowContext;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// SCHEMA KIND
// ============================================================================

/// Built-in schema presets selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// due_date/return_date in YYYY-MM-DD, per-record fee_per_day
    BookReturns,
    /// date_due in MM/DD/YYYY, date_returned in MM/DD/YY, fixed 0.25/day
    LibraryCheckouts,
}

impl SchemaKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SchemaKind::BookReturns => "Book returns",
            SchemaKind::LibraryCheckouts => "Library checkouts",
        }
    }

    /// Short code used on the command line
    pub fn code(&self) -> &str {
        match self {
            SchemaKind::BookReturns => "book-returns",
            SchemaKind::LibraryCheckouts => "library-checkouts",
        }
    }

    pub fn schema(&self) -> ReportSchema {
        match self {
            SchemaKind::BookReturns => ReportSchema::book_returns(),
            SchemaKind::LibraryCheckouts => ReportSchema::library_checkouts(),
        }
    }
}

impl FromStr for SchemaKind {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "book-returns" | "book_returns" => Ok(SchemaKind::BookReturns),
            "library-checkouts" | "library_checkouts" => Ok(SchemaKind::LibraryCheckouts),
            other => Err(FeeError::validation(
                "schema",
                format!(
                    "unknown schema '{}' (expected book-returns or library-checkouts)",
                    other
                ),
            )),
        }
    }
}

// ============================================================================
// FEE RATE
// ============================================================================

/// Where the per-day late fee comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeRate {
    /// Read from a column of every record
    PerRecord { field: String },
    /// Same amount for every record
    Fixed { amount: Decimal },
}

// ============================================================================
// REPORT SCHEMA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSchema {
    /// Column holding the patron identifier
    pub patron_field: String,

    pub due_field: String,
    /// chrono pattern for `due_field`
    pub due_pattern: String,

    pub returned_field: String,
    /// chrono pattern for `returned_field`
    pub returned_pattern: String,

    pub fee_rate: FeeRate,

    /// Header of the fee column in the output file
    pub fee_column: String,
}

impl ReportSchema {
    /// Output column holding the patron identifier (same for every schema)
    pub const PATRON_COLUMN: &'static str = "patron_id";

    pub fn book_returns() -> Self {
        ReportSchema {
            patron_field: "patron_id".to_string(),
            due_field: "due_date".to_string(),
            due_pattern: "%Y-%m-%d".to_string(),
            returned_field: "return_date".to_string(),
            returned_pattern: "%Y-%m-%d".to_string(),
            fee_rate: FeeRate::PerRecord {
                field: "fee_per_day".to_string(),
            },
            fee_column: "total_fees".to_string(),
        }
    }

    pub fn library_checkouts() -> Self {
        ReportSchema {
            patron_field: "patron_id".to_string(),
            due_field: "date_due".to_string(),
            due_pattern: "%m/%d/%Y".to_string(),
            returned_field: "date_returned".to_string(),
            returned_pattern: "%m/%d/%y".to_string(),
            fee_rate: FeeRate::Fixed {
                amount: Decimal::new(25, 2),
            },
            fee_column: "late_fees".to_string(),
        }
    }

    /// Load a schema from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read schema file: {:?}", path.as_ref()))?;

        let schema: ReportSchema =
            serde_json::from_str(&content).context("Failed to parse schema JSON")?;

        schema.validate()?;
        Ok(schema)
    }

    /// Columns every input record must carry
    pub fn required_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.patron_field.as_str(),
            self.due_field.as_str(),
            self.returned_field.as_str(),
        ];
        if let FeeRate::PerRecord { field } = &self.fee_rate {
            fields.push(field.as_str());
        }
        fields
    }

    /// Reject schemas that could never produce a sensible report
    pub fn validate(&self) -> Result<()> {
        for (argument, value) in [
            ("patron_field", &self.patron_field),
            ("due_field", &self.due_field),
            ("returned_field", &self.returned_field),
            ("fee_column", &self.fee_column),
        ] {
            if value.trim().is_empty() {
                return Err(FeeError::validation(argument, "must not be empty"));
            }
        }

        if self.fee_column == Self::PATRON_COLUMN {
            return Err(FeeError::validation(
                "fee_column",
                format!("must differ from '{}'", Self::PATRON_COLUMN),
            ));
        }

        match &self.fee_rate {
            FeeRate::PerRecord { field } if field.trim().is_empty() => {
                return Err(FeeError::validation("fee_rate.field", "must not be empty"));
            }
            FeeRate::Fixed { amount } if amount.is_sign_negative() => {
                return Err(FeeError::validation(
                    "fee_rate.amount",
                    format!("must be non-negative, got {}", amount),
                ));
            }
            _ => {}
        }

        check_pattern("due_pattern", &self.due_pattern)?;
        check_pattern("returned_pattern", &self.returned_pattern)?;

        Ok(())
    }
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self::book_returns()
    }
}

/// A usable pattern must round-trip a date through format + parse
fn check_pattern(argument: &str, pattern: &str) -> Result<()> {
    let sample = NaiveDate::from_ymd_opt(2001, 1, 25)
        .ok_or_else(|| FeeError::validation(argument, "sample date out of range"))?;

    let mut rendered = String::new();
    if std::fmt::write(&mut rendered, format_args!("{}", sample.format(pattern))).is_err() {
        return Err(FeeError::validation(
            argument,
            format!("'{}' is not a valid date pattern", pattern),
        ));
    }

    match NaiveDate::parse_from_str(&rendered, pattern) {
        Ok(parsed) if parsed == sample => Ok(()),
        _ => Err(FeeError::validation(
            argument,
            format!("'{}' does not identify a full calendar date", pattern),
        )),
    }
}

// ============================================================================
// TESTS
// ============================================================================
