//! JSON export of the time-filtered points of a manager.
//!
//! Rows are snapshotted on the owner thread; only the file write runs in the
//! background.

use crate::dispatch::{spawn_background, DispatchHandle};
use crate::manager::base::{BaseManager, DomainStrategy};
use crate::model::point::AlarmLevel;
use chrono::NaiveDateTime;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// One exported point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub domain: String,
    pub name: String,
    pub group: String,
    pub category: String,
    pub status: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub date_first: Option<NaiveDateTime>,
    pub date_latest: Option<NaiveDateTime>,
    /// Observations inside the temporal window.
    pub measurements: usize,
    pub latest_delta: Option<f64>,
    pub alarm_level: Option<AlarmLevel>,
}

#[derive(Debug)]
pub enum ExportError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "export to {} failed: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "export to {} failed to encode: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// Completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
}

/// Snapshot of `manager`'s time-filtered view.
pub fn export_rows<D, S: DomainStrategy<D>>(manager: &BaseManager<D, S>) -> Vec<ExportRow> {
    manager
        .time_filtered_with_ext()
        .map(|(point, ext)| ExportRow {
            domain: manager.domain().to_string(),
            name: point.name.clone(),
            group: point.group.clone(),
            category: point.category.clone(),
            status: point.status.clone(),
            lat: point.position.map(|position| position.lat),
            lon: point.position.map(|position| position.lon),
            date_first: ext.date_first,
            date_latest: ext.date_latest,
            measurements: ext.filtered_count(),
            latest_delta: ext.latest_delta,
            alarm_level: ext.alarm_level,
        })
        .collect()
}

/// Writes `rows` as a pretty JSON array.
pub fn write_json(rows: &[ExportRow], path: &Path) -> Result<ExportOutcome, ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;

    Ok(ExportOutcome {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

/// Writes `rows` on a background thread and posts the outcome to `handle`.
pub fn spawn_json_export<M, C>(
    handle: DispatchHandle<M>,
    rows: Vec<ExportRow>,
    path: PathBuf,
    into_message: C,
) -> io::Result<JoinHandle<()>>
where
    M: Send + 'static,
    C: FnOnce(Result<ExportOutcome, ExportError>) -> M + Send + 'static,
{
    spawn_background(
        "export",
        handle,
        move || {
            let result = write_json(&rows, &path);
            match &result {
                Ok(outcome) => info!(
                    "event=export module=export status=ok rows={}",
                    outcome.rows
                ),
                Err(err) => error!("event=export module=export status=error error={err}"),
            }
            result
        },
        into_message,
    )
}
