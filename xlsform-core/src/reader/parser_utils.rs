//! Cell reference helpers shared by the XML reader and writer

/// Parse a cell reference like "A1" into (row, col) as 0-based indices
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col = 0u32;
    let mut row_str = String::new();

    for ch in cell_ref.chars() {
        if ch.is_ascii_alphabetic() {
            col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else if ch.is_ascii_digit() {
            row_str.push(ch);
        }
    }

    if row_str.is_empty() || col == 0 {
        return None;
    }

    let row = row_str.parse::<u32>().ok()?;

    // Convert to 0-based
    Some((row.saturating_sub(1), col - 1))
}

/// Parse a cell range like "A1:B2" into (start_row, start_col, end_row, end_col).
/// A single reference is treated as a one-cell range.
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    match range.split_once(':') {
        Some((start, end)) => {
            let (start_row, start_col) = parse_cell_ref(start)?;
            let (end_row, end_col) = parse_cell_ref(end)?;
            Some((start_row, start_col, end_row, end_col))
        }
        None => {
            let (row, col) = parse_cell_ref(range)?;
            Some((row, col, row, col))
        }
    }
}

/// Convert column number to letter (0 -> A, 1 -> B, 26 -> AA)
pub fn col_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// Format 0-based (row, col) as an Excel reference
pub fn format_cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Format a 0-based range, collapsing single cells to "A1"
pub fn format_cell_range(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> String {
    if start_row == end_row && start_col == end_col {
        format_cell_ref(start_row, start_col)
    } else {
        format!(
            "{}:{}",
            format_cell_ref(start_row, start_col),
            format_cell_ref(end_row, end_col)
        )
    }
}
