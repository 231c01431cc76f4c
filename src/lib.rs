// Library Fees - Core Library
// Late-fee reports from book-return records, plus small date helpers

pub mod dates;
pub mod error;
pub mod logging;
pub mod output;
pub mod record;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use dates::{add_date_range, date_range, parse_count, reformat_dates};
pub use error::{FeeError, Result, Stage};
pub use record::{RecordLayout, ReturnRecord};
pub use report::{format_fee, FeeReport, FeeReportGenerator, PatronFeeTotal};
pub use schema::{FeeRate, ReportSchema, SchemaKind};
