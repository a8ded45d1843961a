//! Data module
//!
//! Quote record input (JSON, JSON lines, CSV) and publication of ranked slips to Parquet and JSON

mod parquet;
mod publisher;
mod source;

pub use self::parquet::{slip_leg_schema, SlipTableReader, SlipTableWriter};
pub use publisher::{slip_rows, LegRow, PublishedFiles, ResultPublisher, SlipRow};
pub use source::{
    file_source, parse_csv_records, parse_records, source_for, sport_from_path, CsvFileSource,
    DirectorySource, JsonFileSource, QuoteBatch, QuoteRecord, QuoteSource, RawLine, RawPrice,
    RecordIssue, DEFAULT_SPORT,
};
