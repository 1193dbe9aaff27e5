//! Core logic for the Timewarrior balance report.
//!
//! This crate contains:
//! - The allotment language: lexer, parser and the parsed [`Document`]
//! - Owed time: weekday proration of periods and one-off date entries
//! - Spent time: aggregation of tracked intervals per tag
//! - Balance assembly: spent vs. owed rows per tag and in total

mod balance;
pub mod document;
mod error;
pub mod lexer;
mod owing;
pub mod parser;
mod spent;
pub mod timestamp;
pub mod token;
mod totals;
mod window;

pub use balance::{Balance, BalanceRow};
pub use document::{DateEntry, Document, Period, TagBlock, TagKey};
pub use error::{ConfigError, OverflowError};
pub use owing::{compute_owed, compute_owed_in};
pub use parser::{parse_document, parse_document_in, parse_hours};
pub use spent::{TrackedInterval, aggregate_spent};
pub use timestamp::{TimestampError, parse_timestamp};
pub use totals::Totals;
pub use window::ReportWindow;
