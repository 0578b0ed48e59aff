// REFLEX Viz - Delimited Tables
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Modality files are wide (hundreds of landmark columns) and vary between
// exports, so rows are kept as raw records and fields are parsed on demand.

use crate::error::{FieldError, VizError, VizResult};
use csv::StringRecord;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

/// Parse a numeric cell. Empty cells and NaN map to `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a frame key such as `12` or `12.0`.
pub fn parse_frame_key(raw: &str) -> Option<i64> {
    let value = parse_number(raw)?;
    (value.fract() == 0.0).then_some(value as i64)
}

/// Truthiness the way the exports write booleans: `True`, `1`, `1.0`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" => Some(true),
        "false" | "f" | "no" => Some(false),
        other => parse_number(other).map(|n| n != 0.0),
    }
}

/// A headed table with rows kept in file order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: StringRecord,
    columns: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn from_path(path: &Path) -> VizResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| VizError::table(path, e))?;
        Self::from_reader(file).map_err(|e| VizError::table(path, e))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: StringRecord = reader.headers()?.iter().map(str::trim).collect();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|record| Row { table: self, record })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |record| Row { table: self, record })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn has(&self, column: &str) -> bool {
        self.table.has_column(column)
    }

    /// Raw cell text; `None` if the column does not exist.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let idx = *self.table.columns.get(column)?;
        Some(self.record.get(idx).unwrap_or("").trim())
    }

    pub fn require_text(&self, column: &str) -> Result<&'a str, FieldError> {
        self.text(column)
            .ok_or_else(|| FieldError::MissingColumn(column.to_string()))
    }

    /// Numeric cell; `None` when the column is missing, empty, or NaN.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.text(column).and_then(parse_number)
    }

    /// Numeric cell that must exist and parse.
    pub fn require_number(&self, column: &str) -> Result<f64, FieldError> {
        let raw = self.require_text(column)?;
        parse_number(raw).ok_or_else(|| FieldError::Unparseable {
            column: column.to_string(),
            value: raw.to_string(),
        })
    }

    pub fn flag(&self, column: &str) -> Option<bool> {
        self.text(column).and_then(parse_flag)
    }

    /// Deserialize the whole row by header name.
    pub fn deserialize<T: Deserialize<'a>>(&self) -> Result<T, csv::Error> {
        self.record.deserialize(Some(&self.table.headers))
    }
}

/// A table indexed by a frame-key column.
#[derive(Debug, Clone, Default)]
pub struct FrameTable {
    table: Table,
    by_frame: BTreeMap<i64, Vec<usize>>,
}

impl FrameTable {
    /// Index `table` by `key`. Rows whose key is missing or non-integral are
    /// kept in the table but unreachable by frame.
    pub fn index(table: Table, key: &str) -> Result<Self, FieldError> {
        if !table.has_column(key) {
            return Err(FieldError::MissingColumn(key.to_string()));
        }

        let mut by_frame: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (position, row) in table.rows().enumerate() {
            if let Some(frame) = row.text(key).and_then(parse_frame_key) {
                by_frame.entry(frame).or_default().push(position);
            }
        }

        Ok(Self { table, by_frame })
    }

    pub fn frame_count(&self) -> usize {
        self.by_frame.len()
    }

    pub fn rows_for(&self, frame: i64) -> impl Iterator<Item = Row<'_>> {
        self.by_frame
            .get(&frame)
            .into_iter()
            .flatten()
            .filter_map(move |&position| self.table.row(position))
    }

    /// The row to display for `frame`: highest `confidence` when that column
    /// exists, otherwise the first row in file order.
    pub fn select(&self, frame: i64) -> Option<Row<'_>> {
        if !self.table.has_column("confidence") {
            return self.rows_for(frame).next();
        }

        let mut best: Option<(Row<'_>, f64)> = None;
        for row in self.rows_for(frame) {
            let confidence = row.number("confidence").unwrap_or(f64::NEG_INFINITY);
            match best {
                Some((_, current)) if confidence <= current => {}
                _ => best = Some((row, confidence)),
            }
        }
        best.map(|(row, _)| row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_number_rejects_nan_and_blank() {
        assert_eq!(parse_number("0.5"), Some(0.5));
        assert_eq!(parse_number(" 3 "), Some(3.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_parse_frame_key() {
        assert_eq!(parse_frame_key("12"), Some(12));
        assert_eq!(parse_frame_key("12.0"), Some(12));
        assert_eq!(parse_frame_key("12.5"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("1.0"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_row_accessors() {
        let t = table("Frame,Gaze,score\n1,Robot,0.25\n2,,nan\n");
        let row = t.row(1).unwrap();
        assert_eq!(row.text("Gaze"), Some(""));
        assert_eq!(row.number("score"), None);
        assert!(row.text("missing").is_none());
        assert!(matches!(row.require_number("missing"), Err(FieldError::MissingColumn(_))));
        assert!(matches!(row.require_number("score"), Err(FieldError::Unparseable { .. })));
    }

    #[test]
    fn test_select_prefers_highest_confidence() {
        let t = table("frame,confidence,x_0\n5,0.4,1\n5,0.9,2\n6,0.1,3\n");
        let indexed = FrameTable::index(t, "frame").unwrap();
        let row = indexed.select(5).unwrap();
        assert_eq!(row.number("confidence"), Some(0.9));
        assert_eq!(row.number("x_0"), Some(2.0));
        assert!(indexed.select(7).is_none());
    }

    #[test]
    fn test_select_without_confidence_takes_first() {
        let t = table("Frame,Gaze\n3,Robot\n3,Table\n");
        let indexed = FrameTable::index(t, "Frame").unwrap();
        assert_eq!(indexed.select(3).unwrap().text("Gaze"), Some("Robot"));
        assert_eq!(indexed.rows_for(3).count(), 2);
    }

    #[test]
    fn test_index_requires_key_column() {
        let t = table("a,b\n1,2\n");
        assert!(FrameTable::index(t, "Frame").is_err());
    }
}
