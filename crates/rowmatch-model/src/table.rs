#![deny(unsafe_code)]

use std::fmt;

/// A raw cell as supplied by an import or query layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl CellValue {
    /// Wrap a string, treating the empty string as missing.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Float(value) => value.is_nan(),
            Self::Text(_) | Self::Integer(_) | Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_nan() => Ok(()),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

/// Offset from a 0-based row index to its spreadsheet row number (1-based,
/// below a header row).
pub const DISPLAY_ROW_OFFSET: usize = 2;

/// Raw tabular data with heterogeneous cells. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// 1-based source line of each row when read from a file. Empty when
    /// rows sit directly under the header.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_lines: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Push a row read from `line` of its source file.
    pub fn push_row_at(&mut self, line: usize, row: Vec<CellValue>) {
        self.source_lines.resize(self.rows.len(), 0);
        self.source_lines.push(line);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Dataset> for Table {
    fn from(dataset: Dataset) -> Self {
        Self {
            columns: dataset.columns,
            source_lines: dataset.source_lines,
            rows: dataset
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(CellValue::text).collect())
                .collect(),
        }
    }
}

/// Normalized tabular data: every cell is a string and `""` means missing.
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    source_lines: Vec<usize>,
}

impl Dataset {
    /// Build a dataset, padding short rows with `""` and truncating long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            columns,
            rows,
            source_lines: Vec::new(),
        }
    }

    /// Attach the source line of each row; see [`Dataset::display_row`].
    #[must_use]
    pub fn with_source_lines(mut self, lines: Vec<usize>) -> Self {
        self.source_lines = lines;
        self
    }

    /// Convenience constructor used heavily by tests and callers with literal data.
    pub fn from_rows<C, R, S>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            columns.into_iter().map(Into::into).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row number a user sees for `row`: its source line when known,
    /// otherwise its position under a header row.
    pub fn display_row(&self, row: usize) -> usize {
        self.source_lines
            .get(row)
            .copied()
            .filter(|line| *line > 0)
            .unwrap_or(row + DISPLAY_ROW_OFFSET)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    /// Value of a named column, `None` when the column does not exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        Some(self.cell(row, index))
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).map_or("", String::as_str))
    }

    /// Index of `name`, appending an empty column when it is absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Overwrite one cell. Out-of-range coordinates are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *cell = value.into();
        }
    }
}
