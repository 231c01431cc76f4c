// ⚠️ Error Taxonomy
// One enum for every failure the fee pipeline and date helpers can raise

use thiserror::Error;

/// Which stage of a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Date, number, schema or record parsing
    Parsing,
    /// Opening, reading or writing files/streams
    Io,
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Stage::Parsing => "parsing",
            Stage::Io => "io",
        }
    }
}

#[derive(Debug, Error)]
pub enum FeeError {
    /// A date string does not match its pattern or is not a real calendar date
    #[error("invalid date '{value}' (expected pattern {pattern})")]
    Format { value: String, pattern: String },

    /// An argument violates a documented shape constraint
    #[error("invalid argument `{argument}`: {message}")]
    Validation { argument: String, message: String },

    /// A record is missing a field or a field fails to parse
    #[error("line {line}, field `{field}`: {message}")]
    DataFormat {
        line: u64,
        field: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FeeError {
    pub fn format(value: &str, pattern: &str) -> Self {
        FeeError::Format {
            value: value.to_string(),
            pattern: pattern.to_string(),
        }
    }

    pub fn validation(argument: &str, message: impl Into<String>) -> Self {
        FeeError::Validation {
            argument: argument.to_string(),
            message: message.into(),
        }
    }

    pub fn data_format(line: u64, field: &str, message: impl Into<String>) -> Self {
        FeeError::DataFormat {
            line,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Classify the error by the stage that produced it
    pub fn stage(&self) -> Stage {
        match self {
            FeeError::Format { .. } | FeeError::Validation { .. } | FeeError::DataFormat { .. } => {
                Stage::Parsing
            }
            FeeError::Io(_) => Stage::Io,
            FeeError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => Stage::Io,
                _ => Stage::Parsing,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;
