use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

use rowmatch_model::{CellValue, Table};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a headed CSV file into a raw table of text cells.
///
/// The first non-blank record is the header. Blank records are skipped,
/// short records are padded with missing cells and long ones truncated.
/// Each row keeps the file line it starts on.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).with_context(|| format!("read csv: {}", path.display()))?;
    let table = read_records(&bytes, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns.len(),
        "loaded csv table"
    );
    Ok(table)
}

/// Same as [`read_csv_table`] over any reader; `source` names it in errors.
pub fn read_csv_from<R: Read>(mut input: R, source: &str) -> Result<Table> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .with_context(|| format!("read csv: {source}"))?;
    read_records(&bytes, source)
}

/// Maps record byte offsets to 1-based line numbers in one forward pass.
struct LineIndex<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineIndex<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            line: 1,
        }
    }

    /// Line of the first content byte at or after `byte`; skipped blank
    /// lines in front of a record are stepped over.
    fn line_at(&mut self, byte: u64) -> usize {
        let len = self.bytes.len();
        let mut start = usize::try_from(byte).map_or(len, |byte| byte.min(len));
        start = start.max(self.offset);
        while start < len && matches!(self.bytes[start], b'\r' | b'\n') {
            start += 1;
        }
        self.line += self.bytes[self.offset..start]
            .iter()
            .filter(|byte| **byte == b'\n')
            .count();
        self.offset = start;
        self.line
    }
}

fn read_records(bytes: &[u8], source: &str) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut lines = LineIndex::new(bytes);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {source}"))?;
        let line = record
            .position()
            .map_or(lines.line, |position| lines.line_at(position.byte()));
        let values: Vec<String> = record.iter().map(normalize_cell).collect();
        if values.iter().all(String::is_empty) {
            continue;
        }
        match &header {
            None => header = Some(record.iter().map(normalize_header).collect()),
            Some(columns) => rows.push((
                line,
                (0..columns.len())
                    .map(|idx| {
                        values
                            .get(idx)
                            .map_or(CellValue::Missing, |value| CellValue::text(value.as_str()))
                    })
                    .collect(),
            )),
        }
    }

    let mut table = Table::new(header.unwrap_or_default());
    for (line, row) in rows {
        table.push_row_at(line, row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_whitespace_and_bom_are_trimmed() {
        assert_eq!(normalize_header("\u{feff} last   name "), "last name");
        assert_eq!(normalize_cell("  CA "), "CA");
    }

    #[test]
    fn short_rows_are_padded_and_blank_rows_skipped() {
        let input = "lastname,state\n\nSmith,CA\n,\nJones\n";
        let table = read_csv_from(input.as_bytes(), "inline").unwrap();
        assert_eq!(table.columns, vec!["lastname", "state"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec![CellValue::text("Jones"), CellValue::Missing]);
        assert_eq!(table.source_lines, vec![3, 5]);
    }

    #[test]
    fn source_lines_follow_the_file() {
        let input = "\r\nlastname,state\r\nSmith,CA\r\n\r\n\r\n\"Jones\nJr\",TX\r\nDoe,NY\r\n";
        let table = read_csv_from(input.as_bytes(), "inline").unwrap();
        assert_eq!(table.columns, vec!["lastname", "state"]);
        assert_eq!(table.source_lines, vec![3, 6, 8]);
        assert_eq!(table.rows[1][0], CellValue::text("Jones\nJr"));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = read_csv_from("".as_bytes(), "inline").unwrap();
        assert!(table.columns.is_empty());
        assert!(table.is_empty());
    }
}
