//! Session log reading
//!
//! A session log is a CSV file with a `timestamp,X,Y,clicked` header followed by
//! one row per captured sample. Rows are kept as raw fields here; type checks
//! happen in the validator so that each failure maps to its own reason.

use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AnalysisError;

/// Number of fields in a well-formed log row
const FIELDS_PER_ROW: usize = 4;

/// Format of the session id embedded in log file names
pub const SESSION_ID_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const LOG_NAME_MARKER: &str = "_cursor_log_";
const LOG_EXTENSION: &str = ".csv";

/// One log row split into its fields, not yet type-checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub timestamp: String,
    pub x: String,
    pub y: String,
    pub clicked: String,
}

/// Rows recovered from a session log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    pub rows: Vec<RawRow>,
    /// Rows dropped for having the wrong field count
    pub skipped_rows: usize,
}

/// Parse session log text, skipping the header and any malformed row
pub fn parse_log(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    for result in reader.records() {
        let record = match result {
            Ok(record) if record.len() == FIELDS_PER_ROW => record,
            Ok(record) => {
                debug!(
                    line = record.position().map(|p| p.line()),
                    fields = record.len(),
                    "skipping malformed log row"
                );
                parsed.skipped_rows += 1;
                continue;
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable log row");
                parsed.skipped_rows += 1;
                continue;
            }
        };

        parsed.rows.push(RawRow {
            timestamp: record[0].to_string(),
            x: record[1].to_string(),
            y: record[2].to_string(),
            clicked: record[3].to_string(),
        });
    }

    parsed
}

/// Read and parse a session log file
pub fn read_log(path: &Path) -> Result<ParsedLog, AnalysisError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AnalysisError::LogNotFound(path.to_path_buf()),
        _ => AnalysisError::Io(e),
    })?;

    let parsed = parse_log(&text);
    debug!(
        path = %path.display(),
        rows = parsed.rows.len(),
        skipped = parsed.skipped_rows,
        "read session log"
    );
    Ok(parsed)
}

/// Directory of session logs, named `id_{profile}_cursor_log_{session}.csv`
#[derive(Debug, Clone)]
pub struct SessionLogs {
    dir: PathBuf,
}

impl SessionLogs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log for a profile's session
    pub fn log_path(&self, profile_id: u32, session: &str) -> PathBuf {
        self.dir.join(format!(
            "id_{}{}{}{}",
            profile_id, LOG_NAME_MARKER, session, LOG_EXTENSION
        ))
    }

    /// Read the log for a profile's session
    pub fn read(&self, profile_id: u32, session: &str) -> Result<ParsedLog, AnalysisError> {
        read_log(&self.log_path(profile_id, session))
    }

    /// Session id of the most recent log recorded for a profile.
    ///
    /// Logs whose names carry no parseable session timestamp sort before all
    /// others.
    pub fn latest_session(&self, profile_id: u32) -> Result<Option<String>, AnalysisError> {
        let prefix = format!("id_{}{}", profile_id, LOG_NAME_MARKER);
        let mut latest: Option<(Option<NaiveDateTime>, String)> = None;

        let entries = fs::read_dir(&self.dir).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AnalysisError::LogNotFound(self.dir.clone()),
            _ => AnalysisError::Io(e),
        })?;

        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let Some(session) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(LOG_EXTENSION))
            else {
                continue;
            };

            let started = session_started_at(session);
            let newer = match &latest {
                None => true,
                Some((best, _)) => started > *best,
            };
            if newer {
                latest = Some((started, session.to_string()));
            }
        }

        Ok(latest.map(|(_, session)| session))
    }
}

/// Parse the capture start time encoded in a session id
pub fn session_started_at(session: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(session, SESSION_ID_FORMAT).ok()
}
