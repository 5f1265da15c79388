//! Call record loading.
//!
//! Reads records that are already in the canonical shape. JSON files hold an
//! array of records or a single record. CSV files carry a header row using the
//! camelCase field names:
//!
//!   id, agentName, customerName, date, duration, transcript, outcome,
//!   recurringPlan, termiteInspectionUpsold, followUpRequested, followUpReason,
//!   sentiment, callType, upsellAttempted, upsellSuccess, objections,
//!   priceObjection, inspectionBooked, planFramed
//!
//! Only the identity, duration, outcome, sentiment and callType columns are
//! required. `objections` is a `;`-separated list.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CallRecord, CallType, Outcome, Sentiment};

/// Load records from a JSON reader holding an array or a single record.
pub fn load_calls_json<R: Read>(reader: R) -> PipelineResult<Vec<CallRecord>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

/// One CSV row before conversion into a [`CallRecord`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvCallRow {
    id: String,
    agent_name: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    date: String,
    duration: u64,
    #[serde(default)]
    transcript: String,
    outcome: Outcome,
    #[serde(default, deserialize_with = "deserialize_bool")]
    recurring_plan: bool,
    #[serde(default, deserialize_with = "deserialize_bool")]
    termite_inspection_upsold: bool,
    #[serde(default, deserialize_with = "deserialize_bool")]
    follow_up_requested: bool,
    #[serde(default)]
    follow_up_reason: String,
    sentiment: Sentiment,
    call_type: CallType,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    upsell_attempted: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    upsell_success: Option<bool>,
    #[serde(default)]
    objections: String,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    price_objection: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    inspection_booked: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    plan_framed: Option<bool>,
}

impl CsvCallRow {
    fn into_record(self) -> CallRecord {
        let objections: Vec<String> = self
            .objections
            .split(';')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        CallRecord {
            id: self.id,
            agent_name: self.agent_name,
            customer_name: self.customer_name,
            date: self.date,
            duration: self.duration,
            transcript: self.transcript,
            outcome: self.outcome,
            recurring_plan: self.recurring_plan,
            termite_inspection_upsold: self.termite_inspection_upsold,
            follow_up_requested: self.follow_up_requested,
            follow_up_reason: Some(self.follow_up_reason).filter(|r| !r.is_empty()),
            sentiment: self.sentiment,
            call_type: self.call_type,
            upsell_attempted: self.upsell_attempted,
            upsell_success: self.upsell_success,
            objections: (!objections.is_empty()).then_some(objections),
            price_objection: self.price_objection,
            inspection_booked: self.inspection_booked,
            plan_framed: self.plan_framed,
        }
    }
}

/// Load records from a CSV reader.
pub fn load_calls_csv<R: Read>(reader: R) -> PipelineResult<Vec<CallRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize::<CsvCallRow>().enumerate() {
        let row = result.map_err(|source| PipelineError::Csv {
            line: line_num + 2,
            source,
        })?;
        records.push(row.into_record());
    }

    Ok(records)
}

fn open(path: &Path) -> PipelineResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Load records from a `.json` file, a `.csv` file, or a directory of
/// `.json` files.
///
/// Directory entries are read in file-name order. A file in a directory
/// that fails to parse is skipped with a warning; a single file that fails
/// is an error.
pub fn load_calls_path(path: &Path) -> PipelineResult<Vec<CallRecord>> {
    if path.is_dir() {
        return load_calls_dir(path);
    }
    if has_extension(path, "json") {
        load_calls_json(open(path)?)
    } else if has_extension(path, "csv") {
        load_calls_csv(open(path)?)
    } else {
        Err(PipelineError::UnsupportedFile {
            path: path.to_path_buf(),
        })
    }
}

fn load_calls_dir(dir: &Path) -> PipelineResult<Vec<CallRecord>> {
    let io_err = |source: std::io::Error| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && has_extension(&path, "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut records = Vec::new();
    for file in &files {
        match open(file).and_then(load_calls_json) {
            Ok(mut loaded) => records.append(&mut loaded),
            Err(e) => log::warn!("Skipping '{}': {}", file.display(), e),
        }
    }
    log::info!(
        "Loaded {} calls from {} files in '{}'",
        records.len(),
        files.len(),
        dir.display()
    );
    Ok(records)
}

fn parse_bool(s: &str) -> Result<Option<bool>, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(Some(true)),
        "false" | "0" | "no" | "n" => Ok(Some(false)),
        "" => Ok(None),
        other => Err(format!("expected bool value, got '{}'", other)),
    }
}

/// Flexible bool deserializer: handles "true"/"false", "1"/"0", "yes"/"no".
/// Blank is false.
fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_bool(&s)
        .map(|b| b.unwrap_or(false))
        .map_err(serde::de::Error::custom)
}

/// Like [`deserialize_bool`], but blank means absent.
fn deserialize_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_bool(&s).map_err(serde::de::Error::custom)
}
