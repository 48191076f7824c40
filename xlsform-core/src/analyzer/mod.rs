//! Read-only analysis of an XLSForm workbook

use std::path::Path;

use crate::config::AnalyzerConfig;
use crate::error::XlsFormError;
use crate::reader::{self, Record};

pub mod summary;

pub use summary::{
    Choice, ChoiceList, ChoiceLists, FieldDescriptor, FormSummary, GroupDescriptor, SurveySummary,
};

/// Group openers left out of the flat field list
const GROUP_OPENERS: [&str; 4] = ["begin group", "begin_group", "begin repeat", "begin_repeat"];

/// Parse the settings, choices and survey sheets of `path` into a summary.
/// Missing sheets contribute nothing.
pub fn analyze(path: &Path, config: &AnalyzerConfig) -> Result<FormSummary, XlsFormError> {
    let (settings, choices, survey) = {
        let mut workbook = reader::open_any(path)?;
        (
            reader::read_records(&mut workbook, "settings")?,
            reader::read_records(&mut workbook, "choices")?,
            reader::read_records(&mut workbook, "survey")?,
        )
    };
    log::debug!(
        "{}: {} settings rows, {} choice rows, {} survey rows",
        path.display(),
        settings.len(),
        choices.len(),
        survey.len()
    );

    let mut summary = FormSummary {
        file: path.display().to_string(),
        ..Default::default()
    };

    if let Some(first) = settings.into_iter().next() {
        summary.form_id = column(&first, "form_id").to_string();
        summary.form_title = column(&first, "form_title").to_string();
        summary.settings = first;
    }

    summary.choices = collect_choices(&choices);
    summary.survey = classify_survey(&survey, &config.important_patterns);

    Ok(summary)
}

/// Group choice rows by `list_name`; rows without a list are dropped
pub fn collect_choices(rows: &[Record]) -> ChoiceLists {
    let mut lists = ChoiceLists::default();
    for row in rows {
        let list_name = column(row, "list_name");
        if list_name.is_empty() {
            continue;
        }
        lists.push(
            list_name,
            Choice {
                name: column(row, "name").to_string(),
                label: column(row, "label").to_string(),
            },
        );
    }
    lists
}

/// Single pass over survey rows. Groups nest: closing a group restores the
/// enclosing one.
pub fn classify_survey(rows: &[Record], important_patterns: &[String]) -> SurveySummary {
    let patterns: Vec<String> = important_patterns
        .iter()
        .map(|p| p.to_lowercase())
        .collect();

    let mut survey = SurveySummary::default();
    let mut open_groups: Vec<String> = Vec::new();

    for row in rows {
        let raw_type = column(row, "type");
        let field_type = raw_type.to_lowercase();
        let name = column(row, "name").to_string();
        let label = column(row, "label").to_string();

        if field_type.is_empty() {
            continue;
        }

        if field_type.starts_with("begin") {
            if opens_scope(&field_type) {
                open_groups.push(name.clone());
                survey.groups.push(GroupDescriptor {
                    name: name.clone(),
                    label: label.clone(),
                    group_type: field_type.clone(),
                });
            }
        } else if field_type.starts_with("end") {
            if opens_scope(&field_type) {
                open_groups.pop();
            }
            continue;
        }

        let is_select = field_type.starts_with("select");
        let field = FieldDescriptor {
            name,
            field_type,
            label,
            group: open_groups.last().cloned(),
            relevant: non_empty(column(row, "relevant")),
            calculation: non_empty(column(row, "calculation")),
            choices_list: is_select.then(|| choice_list_name(raw_type).to_string()),
        };

        if matches!(field.field_type.as_str(), "date" | "datetime") {
            survey.date_fields.push(field.clone());
        }

        if field.field_type == "calculate" {
            survey.calculated_fields.push(field.clone());
        }

        if is_select {
            survey.select_fields.push(field.clone());
        }

        let lower_name = field.name.to_lowercase();
        if patterns.iter().any(|p| lower_name.contains(p.as_str()))
            && !survey.important_fields.contains(&field)
        {
            survey.important_fields.push(field.clone());
        }

        if !field.name.is_empty() && !GROUP_OPENERS.contains(&field.field_type.as_str()) {
            survey.fields.push(field);
        }
    }

    survey
}

/// List referenced by a select type: `select_one yes_no` -> `yes_no`
pub fn choice_list_name(field_type: &str) -> &str {
    field_type.split_whitespace().nth(1).unwrap_or("")
}

fn opens_scope(field_type: &str) -> bool {
    field_type.contains("group") || field_type.contains("repeat")
}

/// Column value by header; exact header first, then case-insensitive
fn column<'a>(row: &'a Record, key: &str) -> &'a str {
    row.get(key)
        .or_else(|| {
            row.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
