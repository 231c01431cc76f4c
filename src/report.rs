// 🧾 Late-Fee Report
// Read return records, charge late days, total per patron, write one row per patron

use crate::error::{FeeError, Result};
use crate::output::write_atomic;
use crate::record::RecordLayout;
use crate::schema::{FeeRate, ReportSchema, SchemaKind};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// PATRON TOTALS
// ============================================================================

/// Accumulated late fees of one patron
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatronFeeTotal {
    pub patron_id: String,
    /// Full precision; rounding happens only when formatted
    pub total_fee: Decimal,
}

impl PatronFeeTotal {
    /// Two-decimal rendering used in the output file
    pub fn formatted(&self) -> String {
        format_fee(self.total_fee)
    }
}

/// Round half-to-even to cents and always show two fractional digits
pub fn format_fee(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded.to_string()
}

// ============================================================================
// FEE REPORT
// ============================================================================

/// Finished aggregation: patrons in order of their first late return
#[derive(Debug, Clone)]
pub struct FeeReport {
    fee_column: String,
    totals: IndexMap<String, Decimal>,
    grand_total: Decimal,
    records_read: usize,
    late_records: usize,
}

impl FeeReport {
    fn new(fee_column: &str) -> Self {
        FeeReport {
            fee_column: fee_column.to_string(),
            totals: IndexMap::new(),
            grand_total: Decimal::ZERO,
            records_read: 0,
            late_records: 0,
        }
    }

    fn charge(
        &mut self,
        patron_id: String,
        fee: Decimal,
        line: u64,
        rate_field: &str,
    ) -> Result<()> {
        let overflow = || FeeError::data_format(line, rate_field, "fee total overflows");

        let grand_total = self.grand_total.checked_add(fee).ok_or_else(overflow)?;
        let total = self.totals.entry(patron_id).or_insert(Decimal::ZERO);
        *total = total.checked_add(fee).ok_or_else(overflow)?;

        self.grand_total = grand_total;
        self.late_records += 1;
        Ok(())
    }

    pub fn totals(&self) -> Vec<PatronFeeTotal> {
        self.totals
            .iter()
            .map(|(patron_id, total_fee)| PatronFeeTotal {
                patron_id: patron_id.clone(),
                total_fee: *total_fee,
            })
            .collect()
    }

    pub fn total_for(&self, patron_id: &str) -> Option<Decimal> {
        self.totals.get(patron_id).copied()
    }

    /// Sum of every patron total, unrounded
    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    /// Data rows consumed from the input
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Rows that produced a fee
    pub fn late_records(&self) -> usize {
        self.late_records
    }

    /// Number of patrons with outstanding fees
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Write `patron_id,<fee column>` followed by one row per patron
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

        wtr.write_record([ReportSchema::PATRON_COLUMN, self.fee_column.as_str()])?;
        for total in self.totals() {
            wtr.write_record([total.patron_id.as_str(), total.formatted().as_str()])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Batch late-fee calculator parameterised by a `ReportSchema`
///
/// A run is all-or-nothing: the first bad record aborts it and nothing
/// is written.
///
/// # Example:
/// ```
/// use library_fees::{FeeReportGenerator, ReportSchema};
///
/// let input = "patron_id,due_date,return_date,fee_per_day\nA,2021-01-01,2021-01-05,1.00\n";
/// let generator = FeeReportGenerator::new(ReportSchema::book_returns()).unwrap();
///
/// let mut out = Vec::new();
/// generator.generate(input.as_bytes(), &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "patron_id,total_fees\nA,4.00\n");
/// ```
#[derive(Debug, Clone)]
pub struct FeeReportGenerator {
    schema: ReportSchema,
}

impl FeeReportGenerator {
    pub fn new(schema: ReportSchema) -> Result<Self> {
        schema.validate()?;
        Ok(FeeReportGenerator { schema })
    }

    pub fn for_kind(kind: SchemaKind) -> Result<Self> {
        Self::new(kind.schema())
    }

    /// Aggregate fees from `input` without writing anything
    pub fn compute<R: Read>(&self, input: R) -> Result<FeeReport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let layout = RecordLayout::from_headers(&self.schema, reader.headers()?)?;
        let fixed_rate = match &self.schema.fee_rate {
            FeeRate::Fixed { amount } => *amount,
            FeeRate::PerRecord { .. } => Decimal::ZERO,
        };

        let mut report = FeeReport::new(&self.schema.fee_column);

        for (idx, result) in reader.records().enumerate() {
            let row = result?;
            // +2 because: 1-indexed + header row
            let line = row
                .position()
                .map(|pos| pos.line())
                .unwrap_or(idx as u64 + 2);

            let record = layout.parse(&row, line)?;
            report.records_read += 1;

            match record.late_fee(fixed_rate, line, layout.rate_field())? {
                Some(fee) => report.charge(record.patron_id, fee, line, layout.rate_field())?,
                None => debug!(
                    line,
                    patron_id = %record.patron_id,
                    days_late = record.days_late(),
                    "no fee charged"
                ),
            }
        }

        if report.records_read == 0 {
            warn!("input has no return records, report will be empty");
        }

        Ok(report)
    }

    /// Aggregate `input` and write the summary to `output`
    ///
    /// `output` sees nothing unless every record was processed.
    pub fn generate<R: Read, W: Write>(&self, input: R, output: W) -> Result<FeeReport> {
        let report = self.compute(input)?;
        report.write_csv(output)?;
        Ok(report)
    }

    /// File form of [`generate`](Self::generate)
    ///
    /// The report replaces `output` atomically; on failure `output` is
    /// neither created nor modified.
    pub fn generate_file(&self, input: &Path, output: &Path) -> Result<FeeReport> {
        info!(
            input = %input.display(),
            fee_column = %self.schema.fee_column,
            "computing late fees"
        );

        let file = File::open(input)?;
        let report = self.compute(BufReader::new(file))?;

        write_atomic(output, |writer| report.write_csv(writer))?;

        info!(
            output = %output.display(),
            records = report.records_read(),
            late = report.late_records(),
            patrons = report.len(),
            grand_total = %format_fee(report.grand_total()),
            "late-fee report written"
        );

        Ok(report)
    }
}

// ============================================================================
// TESTS
// ============================================================================
