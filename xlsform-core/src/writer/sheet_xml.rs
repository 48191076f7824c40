//! Streaming row insertion for worksheet XML

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::reader::parser_utils::{format_cell_range, format_cell_ref, parse_cell_range, parse_cell_ref};

/// A cell of the inserted row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCell {
    pub value: Option<String>,
    /// Opaque `cellXfs` index copied from a neighbouring cell
    pub style: Option<String>,
}

/// Describes one row to insert into a worksheet
#[derive(Debug, Clone, Default)]
pub struct RowInsertion {
    /// 1-based row number the new row takes; rows from here on move down
    pub at: u32,
    /// Cells of the new row keyed by 0-based column
    pub cells: BTreeMap<u32, NewCell>,
    /// Text cells appended to the header row, keyed by 0-based column
    pub header_cells: BTreeMap<u32, String>,
}

impl RowInsertion {
    /// 0-based row index of a 1-based row number after the insertion
    fn shifted(&self, row0: u32) -> u32 {
        if row0 + 1 >= self.at { row0 + 1 } else { row0 }
    }

    fn column_bounds(&self) -> Option<(u32, u32)> {
        let cols = self.cells.keys().chain(self.header_cells.keys());
        let min = cols.clone().min()?;
        let max = cols.max()?;
        Some((*min, *max))
    }
}

/// Rewrite `xml` with `insertion` applied. Row numbers, cell references,
/// merged ranges and the sheet dimension below the insertion point move down
/// by one. Formulas are left untouched.
pub fn insert_row(xml: &str, insertion: &RowInsertion) -> Result<String> {
    anyhow::ensure!(insertion.at >= 2, "cannot insert above the header row");

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut shifter = RowShifter::new(insertion);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => shifter.element(&mut writer, e, false)?,
            Ok(Event::Empty(e)) => shifter.element(&mut writer, e, true)?,
            Ok(Event::End(e)) => shifter.end(&mut writer, e)?,
            Ok(Event::Eof) => break,
            Ok(e) => writer.write_event(e)?,
            Err(e) => return Err(anyhow::anyhow!("Error parsing XML: {}", e)),
        }
    }

    anyhow::ensure!(shifter.inserted, "worksheet has no sheetData element");
    log::debug!(
        "Inserted row {} and moved {} rows down",
        insertion.at,
        shifter.shifted_rows
    );

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

/// Streaming state of one insertion pass
struct RowShifter<'a> {
    insertion: &'a RowInsertion,
    /// Namespace prefix of `sheetData`, reused for the elements we create
    prefix: String,
    inserted: bool,
    last_row: u32,
    in_header: bool,
    shifted_rows: usize,
}

impl<'a> RowShifter<'a> {
    fn new(insertion: &'a RowInsertion) -> Self {
        Self {
            insertion,
            prefix: String::new(),
            inserted: false,
            last_row: 0,
            in_header: false,
            shifted_rows: 0,
        }
    }

    fn element<W: std::io::Write>(
        &mut self,
        writer: &mut Writer<W>,
        e: BytesStart,
        is_empty: bool,
    ) -> Result<()> {
        let insertion = self.insertion;
        let local_name = e.local_name().as_ref().to_vec();

        let rewritten = match local_name.as_slice() {
            b"sheetData" => {
                self.prefix = element_prefix(&e);
                if is_empty {
                    let end = BytesEnd::new(String::from_utf8(e.name().as_ref().to_vec())?);
                    writer.write_event(Event::Start(e))?;
                    write_new_row(writer, &self.prefix, insertion)?;
                    writer.write_event(Event::End(end))?;
                    self.inserted = true;
                    return Ok(());
                }
                e.into_owned()
            }
            b"row" => {
                let row_num = attr_value(&e, b"r")?
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(self.last_row + 1);
                self.last_row = row_num;

                if !self.inserted && row_num >= insertion.at {
                    write_new_row(writer, &self.prefix, insertion)?;
                    self.inserted = true;
                }

                let new_num = if row_num >= insertion.at {
                    self.shifted_rows += 1;
                    row_num + 1
                } else {
                    row_num
                };
                let new_num = new_num.to_string();
                let header = row_num == 1 && !insertion.header_cells.is_empty();

                // spans go stale once the header grows
                let mut changes = vec![("r", Some(new_num.as_str()))];
                if header {
                    changes.push(("spans", None));
                }
                let row = with_attributes(&e, &changes)?;

                if is_empty && header {
                    let end = BytesEnd::new(String::from_utf8(e.name().as_ref().to_vec())?);
                    writer.write_event(Event::Start(row))?;
                    write_header_cells(writer, &self.prefix, insertion)?;
                    writer.write_event(Event::End(end))?;
                    return Ok(());
                }
                self.in_header = header && !is_empty;
                row
            }
            b"c" => match attr_value(&e, b"r")?.and_then(|r| parse_cell_ref(&r)) {
                Some((row0, col)) if row0 + 1 >= insertion.at => {
                    let new_ref = format_cell_ref(row0 + 1, col);
                    with_attributes(&e, &[("r", Some(new_ref.as_str()))])?
                }
                _ => e.into_owned(),
            },
            b"dimension" => match attr_value(&e, b"ref")?.and_then(|r| parse_cell_range(&r)) {
                Some(range) => {
                    let new_ref = expand_dimension(range, insertion);
                    with_attributes(&e, &[("ref", Some(new_ref.as_str()))])?
                }
                None => e.into_owned(),
            },
            b"mergeCell" => match attr_value(&e, b"ref")?.and_then(|r| parse_cell_range(&r)) {
                Some((sr, sc, er, ec)) => {
                    let new_ref =
                        format_cell_range(insertion.shifted(sr), sc, insertion.shifted(er), ec);
                    with_attributes(&e, &[("ref", Some(new_ref.as_str()))])?
                }
                None => e.into_owned(),
            },
            _ => e.into_owned(),
        };

        if is_empty {
            writer.write_event(Event::Empty(rewritten))?;
        } else {
            writer.write_event(Event::Start(rewritten))?;
        }
        Ok(())
    }

    fn end<W: std::io::Write>(&mut self, writer: &mut Writer<W>, e: BytesEnd) -> Result<()> {
        match e.local_name().as_ref() {
            b"row" if self.in_header => {
                write_header_cells(writer, &self.prefix, self.insertion)?;
                self.in_header = false;
            }
            b"sheetData" if !self.inserted => {
                write_new_row(writer, &self.prefix, self.insertion)?;
                self.inserted = true;
            }
            _ => {}
        }
        writer.write_event(Event::End(e))?;
        Ok(())
    }
}

fn write_new_row<W: std::io::Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    insertion: &RowInsertion,
) -> Result<()> {
    let row_name = qualified(prefix, "row");
    let mut row = BytesStart::new(row_name.as_str());
    row.push_attribute(("r", insertion.at.to_string().as_str()));

    writer.write_event(Event::Start(row))?;
    for (col, cell) in &insertion.cells {
        write_cell(writer, prefix, insertion.at - 1, *col, cell)?;
    }
    writer.write_event(Event::End(BytesEnd::new(row_name.as_str())))?;
    Ok(())
}

fn write_header_cells<W: std::io::Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    insertion: &RowInsertion,
) -> Result<()> {
    for (col, text) in &insertion.header_cells {
        let cell = NewCell {
            value: Some(text.clone()),
            style: None,
        };
        write_cell(writer, prefix, 0, *col, &cell)?;
    }
    Ok(())
}

/// Write `<c>` with an inline string value; a value-less cell keeps only its style
fn write_cell<W: std::io::Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    row0: u32,
    col: u32,
    cell: &NewCell,
) -> Result<()> {
    let value = cell.value.as_deref().filter(|v| !v.is_empty());
    if value.is_none() && cell.style.is_none() {
        return Ok(());
    }

    let cell_name = qualified(prefix, "c");
    let mut c = BytesStart::new(cell_name.as_str());
    c.push_attribute(("r", format_cell_ref(row0, col).as_str()));
    if let Some(style) = &cell.style {
        c.push_attribute(("s", style.as_str()));
    }

    let Some(value) = value else {
        writer.write_event(Event::Empty(c))?;
        return Ok(());
    };

    c.push_attribute(("t", "inlineStr"));
    writer.write_event(Event::Start(c))?;

    let is_name = qualified(prefix, "is");
    let t_name = qualified(prefix, "t");
    writer.write_event(Event::Start(BytesStart::new(is_name.as_str())))?;
    let mut t = BytesStart::new(t_name.as_str());
    if value.trim() != value {
        t.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(t_name.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(is_name.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(cell_name.as_str())))?;
    Ok(())
}

fn expand_dimension((sr, sc, er, ec): (u32, u32, u32, u32), insertion: &RowInsertion) -> String {
    let new_row0 = insertion.at - 1;
    let (mut start_col, mut end_col) = (sc, ec);
    if let Some((min_col, max_col)) = insertion.column_bounds() {
        start_col = start_col.min(min_col);
        end_col = end_col.max(max_col);
    }
    format_cell_range(
        insertion.shifted(sr).min(new_row0),
        start_col,
        insertion.shifted(er).max(new_row0),
        end_col,
    )
}

fn element_prefix(e: &BytesStart) -> String {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
        .unwrap_or_default()
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8(attr.value.to_vec())?));
        }
    }
    Ok(None)
}

/// Copy an element, replacing (`Some`) or dropping (`None`) the named
/// attributes; replacements missing from the original are appended
fn with_attributes(e: &BytesStart, changes: &[(&str, Option<&str>)]) -> Result<BytesStart<'static>> {
    let name = String::from_utf8(e.name().as_ref().to_vec())?;
    let mut out = BytesStart::new(name);
    let mut seen = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        match changes
            .iter()
            .find(|(key, _)| key.as_bytes() == attr.key.as_ref())
        {
            Some((key, Some(value))) => {
                out.push_attribute((*key, *value));
                seen.push(*key);
            }
            Some((key, None)) => seen.push(*key),
            None => out.push_attribute(attr),
        }
    }

    for (key, value) in changes {
        if let Some(value) = value {
            if !seen.contains(key) {
                out.push_attribute((*key, *value));
            }
        }
    }

    Ok(out)
}
