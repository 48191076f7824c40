//! Adding `calculate` rows to the survey sheet of an XLSForm

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

use crate::config::InserterConfig;
use crate::error::XlsFormError;
use crate::reader::{self, Sheet, xml_parser};
use crate::schema::ColumnSchema;
use crate::writer::{self, NewCell, RowInsertion};

pub mod placement;

pub use placement::{Anchor, SurveyRow, insertion_row, locate_anchor};

pub const SURVEY_SHEET: &str = "survey";

/// What to insert and, optionally, in front of which group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub field_name: String,
    pub calculation: String,
    pub before_group: Option<String>,
}

impl CalculationRequest {
    pub fn new(field_name: impl Into<String>, calculation: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            calculation: calculation.into(),
            before_group: None,
        }
    }

    pub fn before(mut self, group: impl Into<String>) -> Self {
        self.before_group = Some(group.into());
        self
    }
}

/// Outcome of a successful insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionReport {
    pub field_name: String,
    pub calculation: String,
    /// 1-based sheet row of the new field
    pub inserted_at_row: u32,
    pub file: String,
    pub anchor: Anchor,
}

/// Insert a `calculate` row into the survey sheet of `path` and save the
/// workbook over the original file. The file is left untouched on any error
/// raised before saving.
pub fn insert_calculation(
    path: &Path,
    request: &CalculationRequest,
    config: &InserterConfig,
) -> Result<InsertionReport, XlsFormError> {
    let survey = {
        let mut workbook = reader::open_xlsx(path)?;
        reader::read_sheet(&mut workbook, SURVEY_SHEET)?
            .ok_or_else(|| XlsFormError::MissingSheet(SURVEY_SHEET.to_string()))?
    };

    let schema = ColumnSchema::from_sheet(&survey);
    let type_col = schema.require("type")?;
    let name_col = schema.require("name")?;
    let label_col = schema.get("label");
    let existing_calc_col = schema.get("calculation");

    let rows = survey_rows(&survey, type_col, name_col);
    if rows.iter().any(|r| r.name == request.field_name) {
        return Err(XlsFormError::DuplicateField(request.field_name.clone()));
    }

    let (at, anchor) = insertion_row(
        &rows,
        request.before_group.as_deref(),
        &config.summary_marker,
    );
    log::info!("Inserting '{}' at row {} ({:?})", request.field_name, at, anchor);

    let file = File::open(path).map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?;

    let sheet_path = xml_parser::resolve_sheet_path(&mut archive, SURVEY_SHEET)
        .map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?
        .ok_or_else(|| XlsFormError::MissingSheet(SURVEY_SHEET.to_string()))?;
    log::debug!("Survey sheet part: {}", sheet_path);

    let sheet_xml = xml_parser::read_file_from_zip(&mut archive, &sheet_path)
        .map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?;

    // A new column goes past every header cell, styled blanks included
    let (calc_col, add_header) = match existing_calc_col {
        Some(col) => (col, false),
        None => {
            let last_header_col = xml_parser::last_column_in_row(&sheet_xml, 0)
                .map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?;
            let next_col = last_header_col.map_or(0, |c| c as usize + 1);
            (next_col.max(survey.width()), true)
        }
    };

    // Formatting comes from the row that moves down to make room
    let styles = if at > 2 {
        xml_parser::extract_row_style_indices(&sheet_xml, at - 1)
            .map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?
    } else {
        BTreeMap::new()
    };

    let mut insertion = RowInsertion {
        at,
        cells: styles
            .into_iter()
            .map(|(col, style)| {
                let cell = NewCell {
                    value: None,
                    style: Some(style),
                };
                (col, cell)
            })
            .collect(),
        header_cells: BTreeMap::new(),
    };
    let mut set_value = |col: usize, value: &str| {
        insertion.cells.entry(col as u32).or_default().value = Some(value.to_string());
    };
    set_value(type_col, "calculate");
    set_value(name_col, &request.field_name);
    set_value(calc_col, &request.calculation);
    if let Some(label_col) = label_col {
        set_value(label_col, "");
    }
    if add_header {
        insertion
            .header_cells
            .insert(calc_col as u32, "calculation".to_string());
    }

    let new_xml = writer::insert_row(&sheet_xml, &insertion)
        .map_err(|e| XlsFormError::UnopenableFile(e.to_string()))?;

    let mut replacements = HashMap::new();
    replacements.insert(sheet_path, new_xml);
    let bytes = writer::rebuild_archive(&mut archive, &replacements)
        .map_err(|e| XlsFormError::UnsavableFile(e.to_string()))?;
    drop(archive);

    writer::save_workbook(path, &bytes).map_err(|e| XlsFormError::UnsavableFile(e.to_string()))?;

    Ok(InsertionReport {
        field_name: request.field_name.clone(),
        calculation: request.calculation.clone(),
        inserted_at_row: at,
        file: path.display().to_string(),
        anchor,
    })
}

/// `type` and `name` of every data row, trimmed
fn survey_rows(survey: &Sheet, type_col: usize, name_col: usize) -> Vec<SurveyRow> {
    (1..survey.height())
        .map(|row| {
            SurveyRow::new(
                row as u32 + 1,
                survey.text(row, type_col),
                survey.text(row, name_col),
            )
        })
        .collect()
}
