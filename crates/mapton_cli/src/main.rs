//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mapton_core` linkage.
//! - Run a deterministic in-memory filter round so the output is stable.

use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use mapton_core::domain::topo::{Dimension, TopoData, TopoPoint};
use mapton_core::domain::ObservationRecord;
use mapton_core::{
    core_version, init_logging, Domain, FormFilter, MonitoringContext, Observation,
};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Ok(dir) = env::var("MAPTON_LOG_DIR") {
        if let Err(err) = init_logging(mapton_core::default_log_level(), &dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("mapton_core version={}", core_version());
    match self_check() {
        Ok((filtered, time_filtered)) => {
            println!("self_check filtered={filtered} time_filtered={time_filtered}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("self_check failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn self_check() -> Result<(usize, usize), String> {
    let mut context = MonitoringContext::new();
    let points: Vec<TopoPoint> = ["P1", "P2", "P3"]
        .into_iter()
        .map(|name| {
            TopoPoint::new(
                name,
                TopoData {
                    dimension: Dimension::D3,
                },
            )
        })
        .collect();
    let observations = vec![
        ObservationRecord::new("P1", Observation::with_value(day(2023, 1, 15)?, 1.0)),
        ObservationRecord::new("P2", Observation::with_value(day(2023, 6, 1)?, 2.0)),
        ObservationRecord::new("P2", Observation::with_value(day(2023, 12, 1)?, 2.5)),
    ];
    context.load_topo(points, observations);

    let mut filter = FormFilter::new();
    filter.set_free_text("P*").map_err(|err| err.to_string())?;
    context
        .apply_form_filter(Domain::Topo, filter)
        .map_err(|err| err.to_string())?;
    context
        .set_temporal_range(day(2023, 5, 1)?, day(2023, 12, 31)?)
        .map_err(|err| err.to_string())?;

    let base = context.topo().base();
    let counts = (base.filtered_indices().len(), base.time_filtered_indices().len());
    info!(
        "event=self_check module=cli status=ok filtered={} time_filtered={}",
        counts.0, counts.1
    );
    Ok(counts)
}

fn day(year: i32, month: u32, day: u32) -> Result<NaiveDateTime, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid date {year}-{month}-{day}"))
}
