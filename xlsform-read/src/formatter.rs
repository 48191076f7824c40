//! Output formatters for form summaries

use anyhow::Result;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use xlsform_core::{FieldDescriptor, FormSummary, PreviewLimits};

const RULE_WIDTH: usize = 60;

/// Print the text report to stdout
pub fn print_text(summary: &FormSummary, limits: &PreviewLimits) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_text(&mut out, summary, limits)?;
    Ok(())
}

/// Print the summary as pretty JSON
pub fn print_json(summary: &FormSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Print an analysis failure in the selected format
pub fn print_error(message: &str, as_json: bool) -> Result<()> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "error": message }))?
        );
    } else {
        println!("ERROR: {}", message);
    }
    Ok(())
}

pub fn render_text<W: Write>(
    out: &mut W,
    summary: &FormSummary,
    limits: &PreviewLimits,
) -> io::Result<()> {
    let survey = &summary.survey;
    let file_name = Path::new(&summary.file)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| summary.file.clone());

    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "XLSForm Analysis: {}", file_name)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    writeln!(out, "=== Form Information ===")?;
    writeln!(out, "  Form ID: {}", or_not_set(&summary.form_id))?;
    writeln!(out, "  Title: {}", or_not_set(&summary.form_title))?;
    writeln!(out)?;

    writeln!(out, "=== Field Statistics ===")?;
    writeln!(out, "  Total fields: {}", survey.fields.len())?;
    writeln!(out, "  Groups: {}", survey.groups.len())?;
    writeln!(out, "  Date fields: {}", survey.date_fields.len())?;
    writeln!(out, "  Calculated fields: {}", survey.calculated_fields.len())?;
    writeln!(out, "  Select fields: {}", survey.select_fields.len())?;
    writeln!(out, "  Choice lists: {}", summary.choices.len())?;
    writeln!(out)?;

    writeln!(out, "=== Important Fields (for task triggers/conditions) ===")?;
    if survey.important_fields.is_empty() {
        writeln!(out, "  (none detected)")?;
    } else {
        for field in survey.important_fields.iter().take(limits.important_fields) {
            writeln!(
                out,
                "  {}: {}{}",
                field.name,
                field.field_type,
                label_suffix(field)
            )?;
        }
        write_overflow(out, survey.important_fields.len(), limits.important_fields)?;
    }
    writeln!(out)?;

    writeln!(out, "=== Date Fields (for task scheduling) ===")?;
    if survey.date_fields.is_empty() {
        writeln!(out, "  (none found)")?;
    } else {
        for field in &survey.date_fields {
            writeln!(out, "  {}{}", field.name, label_suffix(field))?;
        }
    }
    writeln!(out)?;

    writeln!(out, "=== Select Fields (for task conditions) ===")?;
    if survey.select_fields.is_empty() {
        writeln!(out, "  (none found)")?;
    } else {
        for field in survey.select_fields.iter().take(limits.select_fields) {
            let list_name = field.choices_list.as_deref().unwrap_or("");
            let choices = summary.choices.get(list_name).unwrap_or_default();
            let mut preview = choices
                .iter()
                .take(limits.choices_per_field)
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if choices.len() > limits.choices_per_field {
                preview.push_str(&format!(
                    " ... (+{})",
                    choices.len() - limits.choices_per_field
                ));
            }
            writeln!(out, "  {}: [{}]", field.name, preview)?;
        }
        write_overflow(out, survey.select_fields.len(), limits.select_fields)?;
    }
    writeln!(out)?;

    writeln!(out, "=== Calculated Fields ===")?;
    if survey.calculated_fields.is_empty() {
        writeln!(out, "  (none found)")?;
    } else {
        for field in survey.calculated_fields.iter().take(limits.calculated_fields) {
            let calculation = field.calculation.as_deref().unwrap_or("");
            writeln!(
                out,
                "  {}: {}",
                field.name,
                truncate(calculation, limits.calculation_chars)
            )?;
        }
        write_overflow(
            out,
            survey.calculated_fields.len(),
            limits.calculated_fields,
        )?;
    }
    writeln!(out)?;

    writeln!(out, "=== JSON Output ===")?;
    writeln!(out, "(Use --json flag for machine-readable output)")?;

    Ok(())
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

fn label_suffix(field: &FieldDescriptor) -> String {
    if field.label.is_empty() {
        String::new()
    } else {
        format!(" - {}", field.label)
    }
}

fn write_overflow<W: Write>(out: &mut W, total: usize, shown: usize) -> io::Result<()> {
    if total > shown {
        writeln!(out, "  ... and {} more", total - shown)?;
    }
    Ok(())
}

/// Cut to `max` characters, marking the cut with `...`
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlsform_core::analyzer::{Choice, ChoiceLists};

    fn field(name: &str, field_type: &str, label: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            field_type: field_type.to_string(),
            label: label.to_string(),
            ..Default::default()
        }
    }

    fn render(summary: &FormSummary, limits: &PreviewLimits) -> String {
        let mut out = Vec::new();
        render_text(&mut out, summary, limits).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_form_report() {
        let summary = FormSummary {
            file: "forms/app/empty.xlsx".to_string(),
            ..Default::default()
        };

        let expected = "\
============================================================
XLSForm Analysis: empty.xlsx
============================================================

=== Form Information ===
  Form ID: (not set)
  Title: (not set)

=== Field Statistics ===
  Total fields: 0
  Groups: 0
  Date fields: 0
  Calculated fields: 0
  Select fields: 0
  Choice lists: 0

=== Important Fields (for task triggers/conditions) ===
  (none detected)

=== Date Fields (for task scheduling) ===
  (none found)

=== Select Fields (for task conditions) ===
  (none found)

=== Calculated Fields ===
  (none found)

=== JSON Output ===
(Use --json flag for machine-readable output)
";
        assert_eq!(render(&summary, &PreviewLimits::default()), expected);
    }

    #[test]
    fn test_sections_with_fields() {
        let mut summary = FormSummary {
            file: "delivery.xlsx".to_string(),
            form_id: "delivery".to_string(),
            form_title: "Delivery Report".to_string(),
            ..Default::default()
        };

        let dob = field("dob", "date", "Date of birth");
        summary.survey.date_fields.push(dob.clone());
        summary.survey.important_fields.push(dob);

        let mut risk = field("risk", "select_one risk_level", "");
        risk.choices_list = Some("risk_level".to_string());
        summary.survey.select_fields.push(risk);

        let mut age = field("age", "calculate", "");
        age.calculation = Some("int((today() - ${dob}) div 365.25)".to_string());
        summary.survey.calculated_fields.push(age);

        for name in ["high", "medium", "low"] {
            summary.choices.push(
                "risk_level",
                Choice {
                    name: name.to_string(),
                    label: name.to_string(),
                },
            );
        }

        let text = render(&summary, &PreviewLimits::default());
        assert!(text.contains("  Form ID: delivery\n  Title: Delivery Report\n"));
        assert!(text.contains("  dob: date - Date of birth\n"));
        assert!(text.contains("  dob - Date of birth\n"));
        assert!(text.contains("  risk: [high, medium, low]\n"));
        assert!(text.contains("  age: int((today() - ${dob}) div 365.25)\n"));
        assert!(text.contains("  Choice lists: 1\n"));
    }

    #[test]
    fn test_preview_limits() {
        let mut summary = FormSummary::default();
        for i in 0..4 {
            summary
                .survey
                .important_fields
                .push(field(&format!("visit_{}", i), "text", ""));
        }

        let mut signs = field("signs", "select_multiple symptoms", "");
        signs.choices_list = Some("symptoms".to_string());
        summary.survey.select_fields.push(signs);
        let mut choices = ChoiceLists::default();
        for name in ["fever", "cough", "rash", "pain"] {
            choices.push(
                "symptoms",
                Choice {
                    name: name.to_string(),
                    label: String::new(),
                },
            );
        }
        summary.choices = choices;

        let mut calc = field("flag", "calculate", "");
        calc.calculation = Some("if(${a}='yes','y','n')".to_string());
        summary.survey.calculated_fields.push(calc);

        let limits = PreviewLimits {
            important_fields: 2,
            select_fields: 10,
            choices_per_field: 2,
            calculated_fields: 8,
            calculation_chars: 5,
        };
        let text = render(&summary, &limits);
        assert!(text.contains("  visit_1: text\n  ... and 2 more\n"));
        assert!(!text.contains("visit_2"));
        assert!(text.contains("  signs: [fever, cough ... (+2)]\n"));
        assert!(text.contains("  flag: if(${...\n"));
    }

    #[test]
    fn test_select_without_known_list() {
        let mut summary = FormSummary::default();
        let mut field = field("broken", "select_one", "");
        field.choices_list = Some(String::new());
        summary.survey.select_fields.push(field);

        let text = render(&summary, &PreviewLimits::default());
        assert!(text.contains("  broken: []\n"));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("short", 50), "short");
    }
}
