//! Choosing the survey row a new calculation goes in front of

use serde::Serialize;

/// The `type` and `name` of one survey row, with its 1-based sheet row number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRow {
    pub row: u32,
    pub field_type: String,
    pub name: String,
}

impl SurveyRow {
    pub fn new(row: u32, field_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            row,
            field_type: field_type.into(),
            name: name.into(),
        }
    }

    fn opens_scope(&self) -> bool {
        self.field_type.trim().to_lowercase().starts_with("begin")
    }

    fn lower_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Why the new row landed where it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "group")]
pub enum Anchor {
    /// Before the group requested by the caller
    Group(String),
    /// Before the form's summary group
    SummaryGroup(String),
    /// After the last row with a type
    EndOfContent,
}

/// Find the group row to insert in front of: the requested group first,
/// then the first summary group. Returns the row number and the anchor.
pub fn locate_anchor(
    rows: &[SurveyRow],
    before_group: Option<&str>,
    summary_marker: &str,
) -> Option<(u32, Anchor)> {
    if let Some(group) = before_group {
        let wanted = group.trim().to_lowercase();
        let found = rows
            .iter()
            .find(|r| r.opens_scope() && r.lower_name() == wanted);
        match found {
            Some(r) => return Some((r.row, Anchor::Group(r.name.trim().to_string()))),
            None => log::warn!("Group '{}' not found, falling back to default placement", group),
        }
    }

    let marker = summary_marker.to_lowercase();
    rows.iter()
        .find(|r| {
            let name = r.lower_name();
            r.opens_scope() && (name.contains(&marker) || name == "group_summary")
        })
        .map(|r| (r.row, Anchor::SummaryGroup(r.name.trim().to_string())))
}

/// Row number the new calculation takes. Without an anchor it goes one past
/// the last row that has a type; the header counts as row 1.
pub fn insertion_row(
    rows: &[SurveyRow],
    before_group: Option<&str>,
    summary_marker: &str,
) -> (u32, Anchor) {
    if let Some(found) = locate_anchor(rows, before_group, summary_marker) {
        return found;
    }

    let last_content_row = rows
        .iter()
        .filter(|r| !r.field_type.trim().is_empty())
        .map(|r| r.row)
        .max()
        .unwrap_or(1);

    (last_content_row + 1, Anchor::EndOfContent)
}
