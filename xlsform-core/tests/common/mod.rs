#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use xlsform_core::reader::parser_utils::format_cell_ref;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// One worksheet of a mock workbook. Empty strings produce no cell unless the
/// row is styled.
pub struct MockSheet<'a> {
    pub name: &'a str,
    pub rows: Vec<Vec<&'a str>>,
    /// (1-based row, style index) applied to every cell of that row
    pub styled_rows: Vec<(u32, u32)>,
}

impl<'a> MockSheet<'a> {
    pub fn new(name: &'a str, rows: &[&[&'a str]]) -> Self {
        Self {
            name,
            rows: rows.iter().map(|r| r.to_vec()).collect(),
            styled_rows: Vec::new(),
        }
    }

    pub fn styled(mut self, row: u32, style: u32) -> Self {
        self.styled_rows.push((row, style));
        self
    }

    fn to_xml(&self) -> String {
        let width = self.rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
"#,
        );

        if !self.rows.is_empty() && width > 0 {
            xml.push_str(&format!(
                r#"<dimension ref="A1:{}"/>"#,
                format_cell_ref(self.rows.len() as u32 - 1, width as u32 - 1)
            ));
        }

        xml.push_str("<sheetData>");
        for (i, row) in self.rows.iter().enumerate() {
            let row_num = i as u32 + 1;
            let style = self
                .styled_rows
                .iter()
                .find(|(r, _)| *r == row_num)
                .map(|(_, s)| *s);

            xml.push_str(&format!(r#"<row r="{}">"#, row_num));
            for (col, value) in row.iter().enumerate() {
                let cell_ref = format_cell_ref(i as u32, col as u32);
                let style_attr = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
                if value.is_empty() {
                    if style.is_some() {
                        xml.push_str(&format!(r#"<c r="{}"{}/>"#, cell_ref, style_attr));
                    }
                    continue;
                }
                xml.push_str(&format!(
                    r#"<c r="{}"{} t="inlineStr"><is><t>{}</t></is></c>"#,
                    cell_ref,
                    style_attr,
                    escape(value)
                ));
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// Helper to create a minimal valid XLSX file for testing
pub fn create_mock_xlsx(path: &Path, sheets: &[MockSheet]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // 1. [Content_Types].xml
    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    // 2. _rels/.rels
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    // 3. xl/workbook.xml
    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            sheet.name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    // 4. xl/_rels/workbook.xml.rels
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    rels_xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    ));
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    // 5. xl/styles.xml with a few cell formats to reference
    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="1"><fill><patternFill patternType="none"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="49" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#.as_bytes())?;

    // 6. worksheets
    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet.to_xml().as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Raw XML of a part inside an xlsx file
pub fn read_part(path: &Path, name: &str) -> anyhow::Result<String> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut content = String::new();
    archive.by_name(name)?.read_to_string(&mut content)?;
    Ok(content)
}

pub const SURVEY_HEADER: &[&str] = &["type", "name", "label", "calculation"];

/// A small delivery form with a danger-signs group and a summary group
pub fn delivery_form() -> Vec<MockSheet<'static>> {
    vec![
        MockSheet::new(
            "survey",
            &[
                SURVEY_HEADER,
                &["text", "patient_name", "Patient name", ""],
                &["date", "dob", "Date of birth", ""],
                &["begin group", "group_danger_signs", "Danger signs", ""],
                &["select_one yes_no", "fever", "Fever?", ""],
                &["end group", "", "", ""],
                &["begin group", "group_summary", "Summary", ""],
                &["note", "summary_note", "Review", ""],
                &["end group", "", "", ""],
            ],
        ),
        MockSheet::new(
            "choices",
            &[
                &["list_name", "name", "label"],
                &["yes_no", "yes", "Yes"],
                &["yes_no", "no", "No"],
            ],
        ),
        MockSheet::new(
            "settings",
            &[
                &["form_title", "form_id", "version"],
                &["Delivery Report", "delivery", "2024-01-01"],
            ],
        ),
    ]
}
