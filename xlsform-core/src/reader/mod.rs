//! XLSForm workbook reader using calamine

use calamine::{Data, Range, Reader, Sheets, Xlsx, open_workbook, open_workbook_auto};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::error::XlsFormError;

pub mod parser_utils;
pub mod workbook;
pub mod xml_parser;

pub use workbook::{CellValue, Record, Sheet};

/// Fail with `FileNotFound` before any parse attempt
pub fn ensure_exists(path: &Path) -> Result<(), XlsFormError> {
    if path.exists() {
        Ok(())
    } else {
        Err(XlsFormError::FileNotFound(path.to_path_buf()))
    }
}

/// Whether the path carries the `.xlsx` extension (case-insensitive)
pub fn has_xlsx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

/// Open any format calamine understands (xlsx, xlsm, xls, ods)
pub fn open_any(path: &Path) -> Result<Sheets<BufReader<File>>, XlsFormError> {
    ensure_exists(path)?;
    open_workbook_auto(path).map_err(|e| XlsFormError::UnopenableFile(e.to_string()))
}

/// Open an OOXML workbook; the inserter only edits this format
pub fn open_xlsx(path: &Path) -> Result<Xlsx<BufReader<File>>, XlsFormError> {
    ensure_exists(path)?;
    open_workbook::<Xlsx<_>, _>(path).map_err(|e| XlsFormError::UnopenableFile(e.to_string()))
}

/// Read the sheet named exactly `name`, or `None` if the workbook has no such sheet
pub fn read_sheet<RS, R>(workbook: &mut R, name: &str) -> Result<Option<Sheet>, XlsFormError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Ok(None);
    }

    let range = workbook
        .worksheet_range(name)
        .map_err(|e| XlsFormError::UnopenableFile(format!("sheet '{}': {:?}", name, e)))?;

    log::debug!(
        "Read sheet '{}' ({} x {} from {:?})",
        name,
        range.height(),
        range.width(),
        range.start()
    );

    Ok(Some(parse_sheet(name, &range)))
}

/// Read a sheet as header-keyed records; a missing sheet yields no records
pub fn read_records<RS, R>(workbook: &mut R, name: &str) -> Result<Vec<Record>, XlsFormError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    Ok(read_sheet(workbook, name)?
        .map(|sheet| sheet.records())
        .unwrap_or_default())
}

/// Anchor a calamine range at A1 so row and column indices are absolute
fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let Some((row_start, col_start)) = range.start() else {
        return Sheet::new(name, Vec::new());
    };

    let mut rows = vec![Vec::new(); row_start as usize];
    for data_row in range.rows() {
        let mut row = vec![CellValue::Empty; col_start as usize];
        row.extend(data_row.iter().map(parse_cell_value));
        rows.push(row);
    }

    Sheet::new(name, rows)
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
