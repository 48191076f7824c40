//! Writer module for editing XLSX worksheets in place

pub mod sheet_xml;
mod xlsx_writer;

pub use sheet_xml::{NewCell, RowInsertion, insert_row};
pub use xlsx_writer::{rebuild_archive, save_workbook};
