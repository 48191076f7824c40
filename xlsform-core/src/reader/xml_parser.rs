//! XML parsing utilities for locating worksheet parts and cell styles in XLSX files

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use zip::ZipArchive;

use super::parser_utils::parse_cell_ref;

/// Read a whole archive entry as UTF-8 text
pub fn read_file_from_zip(
    archive: &mut ZipArchive<impl Read + Seek>,
    filename: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(filename)
        .with_context(|| format!("Missing archive entry: {}", filename))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Find the archive path of the worksheet called `sheet_name`
/// (e.g. "xl/worksheets/sheet1.xml"), following workbook.xml and its rels.
pub fn resolve_sheet_path(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheet_name: &str,
) -> Result<Option<String>> {
    let rels_xml = read_file_from_zip(archive, "xl/_rels/workbook.xml.rels")?;
    let rels = parse_relationships(&rels_xml)?;

    let workbook_xml = read_file_from_zip(archive, "xl/workbook.xml")?;
    let Some(rel_id) = find_sheet_rel_id(&workbook_xml, sheet_name)? else {
        return Ok(None);
    };

    Ok(rels.get(&rel_id).map(|target| normalize_target(target)))
}

/// Map relationship ids to their targets
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value()?.into_owned(),
                        b"Target" => target = attr.unescape_value()?.into_owned(),
                        _ => {}
                    }
                }
                rels.insert(id, target);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
    }

    Ok(rels)
}

fn find_sheet_rel_id(workbook_xml: &str, sheet_name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(workbook_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = String::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    // r:id, whatever the relationship namespace prefix is
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        rel_id = attr.unescape_value()?.into_owned();
                    } else if attr.key.as_ref() == b"name" {
                        name = attr.unescape_value()?.into_owned();
                    }
                }
                if name == sheet_name {
                    return Ok(Some(rel_id));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
    }

    Ok(None)
}

/// Relationship targets are relative to `xl/` unless absolute
fn normalize_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// Extract the style index of every styled cell in one row (0-based),
/// keyed by 0-based column
pub fn extract_row_style_indices(sheet_xml: &str, row: u32) -> Result<BTreeMap<u32, String>> {
    Ok(row_cells(sheet_xml, row)?
        .into_iter()
        .filter_map(|(col, style)| style.map(|s| (col, s)))
        .collect())
}

/// Highest 0-based column holding a `<c>` element in one row, styled blanks
/// included
pub fn last_column_in_row(sheet_xml: &str, row: u32) -> Result<Option<u32>> {
    Ok(row_cells(sheet_xml, row)?.keys().next_back().copied())
}

/// Every cell element of one row (0-based) with its optional style index
fn row_cells(sheet_xml: &str, row: u32) -> Result<BTreeMap<u32, Option<String>>> {
    let mut cells = BTreeMap::new();
    let mut reader = Reader::from_str(sheet_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                let mut position = None;
                let mut style = None;

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"r" => {
                            position = parse_cell_ref(&String::from_utf8_lossy(&attr.value));
                        }
                        b"s" => {
                            style = Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                        _ => {}
                    }
                }

                if let Some((r, c)) = position {
                    if r == row {
                        cells.insert(c, style);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
    }

    Ok(cells)
}
