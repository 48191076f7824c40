//! XLSForm workbook utilities
//!
//! Reads XLSForm spreadsheets (survey, choices and settings sheets) with
//! calamine, summarizes their fields and inserts `calculate` rows into the
//! survey sheet by rewriting the worksheet XML inside the xlsx archive.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod inserter;
pub mod logging;
pub mod reader;
pub mod schema;
pub mod writer;

pub use analyzer::{FieldDescriptor, FormSummary, GroupDescriptor, analyze};
pub use config::{AnalyzerConfig, InserterConfig, PreviewLimits, XlsFormConfig};
pub use error::XlsFormError;
pub use inserter::{Anchor, CalculationRequest, InsertionReport, insert_calculation};
