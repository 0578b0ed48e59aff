// REFLEX Viz - Typed Session Records
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::lists::SPEECH_EMOTIONS;
use super::table::{parse_frame_key, parse_number, Row, Table};
use crate::cursor::Window;
use crate::error::FieldError;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::warn;

fn frame_key<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_frame_key(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid frame '{}'", raw)))
}

/// Parse every row, logging and dropping the ones that fail.
fn parse_rows<'a, T, E: Display>(
    kind: &str,
    table: &'a Table,
    parse: impl Fn(Row<'a>) -> Result<T, E>,
) -> Vec<T> {
    table
        .rows()
        .enumerate()
        .filter_map(|(position, row)| match parse(row) {
            Ok(value) => Some(value),
            Err(e) => {
                // +2: header line and 1-based numbering
                warn!("[DATA] Dropping {} on line {}: {}", kind, position + 2, e);
                None
            }
        })
        .collect()
}

fn require_columns(table: &Table, columns: &[&str]) -> Result<(), FieldError> {
    match columns.iter().find(|c| !table.has_column(c)) {
        Some(missing) => Err(FieldError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// One robot-failure phase from `analysis.csv`, bounded in frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FailurePhase {
    #[serde(rename = "Start Frame", deserialize_with = "frame_key")]
    pub start_frame: i64,
    #[serde(rename = "End Frame", deserialize_with = "frame_key")]
    pub end_frame: i64,
    #[serde(rename = "Round No.")]
    pub round: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "State")]
    pub state: String,
}

impl FailurePhase {
    pub const REQUIRED_COLUMNS: [&'static str; 5] =
        ["Start Frame", "End Frame", "Round No.", "Action", "State"];

    /// Phases from `analysis.csv`. A malformed row is dropped on its own.
    pub fn from_table(table: &Table) -> Result<Vec<Self>, FieldError> {
        require_columns(table, &Self::REQUIRED_COLUMNS)?;
        Ok(parse_rows("failure phase", table, |row| row.deserialize::<Self>()))
    }

    /// Round number as written, without a trailing `.0` from float exports.
    pub fn round_label(&self) -> &str {
        self.round.strip_suffix(".0").unwrap_or(&self.round)
    }

    pub fn headline(&self) -> String {
        format!(
            "# {} Failure at Round {} - Phase: {}",
            self.action,
            self.round_label(),
            self.state
        )
    }

    /// Overlay image stem: the action name, with a `1` suffix once the robot
    /// is explaining or resolving the failure.
    pub fn image_stem(&self) -> String {
        let explained = matches!(self.state.as_str(), "Explanation" | "Resolution");
        format!("{}{}", self.action.to_lowercase(), if explained { "1" } else { "" })
    }
}

impl Window for FailurePhase {
    type Pos = i64;

    fn start(&self) -> i64 {
        self.start_frame
    }

    fn end(&self) -> i64 {
        self.end_frame
    }
}

/// One transcribed utterance from `speech.csv`, bounded in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    pub speaker: String,
    pub text: String,
    pub begin: f64,
    pub end: f64,
    /// Prosody scores in `SPEECH_EMOTIONS` order.
    pub emotions: Vec<(&'static str, f64)>,
}

impl SpeechSegment {
    pub const REQUIRED_COLUMNS: [&'static str; 4] = ["Id", "Text", "BeginTime", "EndTime"];

    /// Utterances from `speech.csv`. Rows with unusable timing are dropped;
    /// blank or NaN emotion scores are left out of that segment.
    pub fn from_table(table: &Table) -> Result<Vec<Self>, FieldError> {
        require_columns(table, &Self::REQUIRED_COLUMNS)?;
        Ok(parse_rows("speech segment", table, |row| Self::from_row(&row)))
    }

    fn from_row(row: &Row<'_>) -> Result<Self, FieldError> {
        let emotions = SPEECH_EMOTIONS
            .iter()
            .filter_map(|&name| row.number(name).map(|v| (name, v)))
            .collect();

        Ok(Self {
            speaker: row.require_text("Id")?.to_string(),
            text: row.require_text("Text")?.to_string(),
            begin: row.require_number("BeginTime")?,
            end: row.require_number("EndTime")?,
            emotions,
        })
    }

    pub fn caption(&self) -> String {
        format!("### {} \n ({})", self.text, self.speaker)
    }
}

impl Window for SpeechSegment {
    type Pos = f64;

    fn start(&self) -> f64 {
        self.begin
    }

    fn end(&self) -> f64 {
        self.end
    }
}

/// Frame index to session time, from `time.csv`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeMap {
    seconds: HashMap<i64, f64>,
}

impl TimeMap {
    pub fn from_table(table: &Table) -> Result<Self, FieldError> {
        require_columns(table, &["Frame", "Seconds"])?;

        let seconds = table
            .rows()
            .filter_map(|row| {
                let frame = row.text("Frame").and_then(parse_frame_key)?;
                let secs = row.text("Seconds").and_then(parse_number)?;
                Some((frame, secs))
            })
            .collect();

        Ok(Self { seconds })
    }

    pub fn seconds(&self, frame: i64) -> Option<f64> {
        self.seconds.get(&frame).copied()
    }

    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }
}
