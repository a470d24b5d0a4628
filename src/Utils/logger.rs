use crate::numerical::iteration_log::IterationLog;
use crate::numerical::solver_errors::SolverError;
use chrono::Local;
use csv::Writer;
use log::info;
use nalgebra::DMatrix;
use simplelog::*;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tabled::{builder::Builder, settings::Style};

/// "debug" | "info" | "warn" | "error" map to a level filter, "off" | "none" disable logging (Ok(None))
pub fn parse_loglevel(level: &str) -> Result<Option<LevelFilter>, SolverError> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Some(LevelFilter::Debug)),
        "info" => Ok(Some(LevelFilter::Info)),
        "warn" => Ok(Some(LevelFilter::Warn)),
        "error" => Ok(Some(LevelFilter::Error)),
        "off" | "none" => Ok(None),
        other => Err(SolverError::InvalidParameter(format!(
            "loglevel must be debug, info, warn, error, off or none, got '{}'",
            other
        ))),
    }
}

/// name of the log file for the current moment, e.g. log_2024-05-01_12-00-00.txt
pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

static LOGGER_INSTALLED: OnceLock<LevelFilter> = OnceLock::new();

/// true once a solver run has installed the global logger
pub fn logger_installed() -> bool {
    LOGGER_INSTALLED.get().is_some()
}

/// Initialize terminal logging (and optionally a log file) for a solver run.
/// Returns true if a logger is active for this run. The global logger can be set only once
/// per process: later runs only change the maximum level ("off" mutes it) and never create
/// another log file. A later run cannot log more verbosely than the installed logger.
pub fn init_logger(loglevel: &Option<String>, save_log: bool) -> Result<bool, SolverError> {
    let level = match loglevel {
        Some(level) => parse_loglevel(level)?,
        None => Some(LevelFilter::Info),
    };
    let Some(level) = level else {
        log::set_max_level(LevelFilter::Off);
        return Ok(false);
    };
    if let Some(installed) = LOGGER_INSTALLED.get() {
        log::set_max_level(level.min(*installed));
        return Ok(true);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if save_log {
        let file = File::create(log_file_name()).map_err(|e| {
            SolverError::InvalidParameter(format!("cannot create log file: {}", e))
        })?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            let _ = LOGGER_INSTALLED.set(level);
        }
        // some other logger owns the process
        Err(_) => log::set_max_level(level),
    }
    Ok(true)
}

/// two-column table of run statistics, rows in the given order
pub fn statistics_table(stats: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in stats {
        builder.push_record([key.to_string(), value.clone()]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// save matrix with column titles into csv file
pub fn save_matrix_to_csv(matrix: &DMatrix<f64>, headers: &[String], filename: &Path) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(headers)?;
    for row in matrix.row_iter() {
        let row_data: Vec<String> = row.iter().map(|val| val.to_string()).collect();
        writer.write_record(&row_data)?;
    }
    writer.flush()?;
    Ok(())
}

/// iteration table of a solver run as csv: Iteration #, F norm, D norm, X_0..X_n-1
pub fn save_trace_to_csv(trace: &IterationLog, filename: &Path) -> io::Result<()> {
    save_matrix_to_csv(&trace.to_matrix(), &trace.headers(), filename)?;
    info!("iteration table saved to {}", filename.display());
    Ok(())
}
