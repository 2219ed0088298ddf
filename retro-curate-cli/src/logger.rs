//! Terminal logger with an optional plain-text mirror file.
//!
//! Warnings and errors go to stderr with a coloured prefix, everything else to
//! stdout as-is (callers colour their own output). Records from dependencies
//! are dropped unless the verbosity is `debug`.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::cli_types::Verbosity;
use crate::error::CliError;

const OWN_TARGET_PREFIX: &str = "retro_curate";

pub(crate) struct CliLogger {
    level: LevelFilter,
    /// Timestamps, levels and targets on every line; all targets shown.
    detailed: bool,
    file: Option<Mutex<File>>,
}

/// Maximum level and detail flag for the command-line flags.
pub(crate) fn level_for(verbosity: Verbosity, quiet: bool) -> (LevelFilter, bool) {
    let detailed = verbosity == Verbosity::Debug;
    if quiet {
        return (LevelFilter::Warn, detailed);
    }
    let level = match verbosity {
        Verbosity::Info => LevelFilter::Info,
        Verbosity::Verbose => LevelFilter::Debug,
        Verbosity::Vverbose | Verbosity::Debug => LevelFilter::Trace,
    };
    (level, detailed)
}

impl CliLogger {
    pub(crate) fn new(
        verbosity: Verbosity,
        quiet: bool,
        log_file: Option<&Path>,
    ) -> Result<Self, CliError> {
        let (level, detailed) = level_for(verbosity, quiet);
        let file = match log_file {
            Some(path) => Some(Mutex::new(
                File::create(path).map_err(|e| CliError::log_file(path, e))?,
            )),
            None => None,
        };
        Ok(Self {
            level,
            detailed,
            file,
        })
    }

    fn format(&self, record: &Record) -> String {
        let prefix = match record.level() {
            Level::Error => format!("{} ", "error:".if_supports_color(Stderr, |t| t.red())),
            Level::Warn => format!("{} ", "warning:".if_supports_color(Stderr, |t| t.yellow())),
            _ => String::new(),
        };
        if self.detailed {
            format!(
                "{} {:<5} {}: {}{}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                prefix,
                record.args()
            )
        } else {
            format!("{}{}", prefix, record.args())
        }
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
            && (self.detailed || metadata.target().starts_with(OWN_TARGET_PREFIX))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        match record.level() {
            Level::Error | Level::Warn => eprintln!("{line}"),
            _ => println!("{line}"),
        }
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", strip_ansi_escapes::strip_str(&line));
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Install `logger` as the process logger.
pub(crate) fn init(logger: CliLogger) -> Result<(), CliError> {
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for(Verbosity::Info, false), (LevelFilter::Info, false));
        assert_eq!(level_for(Verbosity::Verbose, false), (LevelFilter::Debug, false));
        assert_eq!(level_for(Verbosity::Vverbose, false), (LevelFilter::Trace, false));
        assert_eq!(level_for(Verbosity::Debug, false), (LevelFilter::Trace, true));
        assert_eq!(level_for(Verbosity::Verbose, true), (LevelFilter::Warn, false));
    }

    #[test]
    fn test_dependency_targets_hidden() {
        let logger = CliLogger::new(Verbosity::Vverbose, false, None).unwrap();
        let own = Metadata::builder()
            .level(Level::Debug)
            .target("retro_curate_lib::sync")
            .build();
        let foreign = Metadata::builder()
            .level(Level::Info)
            .target("quick_xml::reader")
            .build();
        assert!(logger.enabled(&own));
        assert!(!logger.enabled(&foreign));

        let detailed = CliLogger::new(Verbosity::Debug, false, None).unwrap();
        assert!(detailed.enabled(&foreign));
    }

    #[test]
    fn test_quiet_keeps_warnings() {
        let logger = CliLogger::new(Verbosity::Info, true, None).unwrap();
        let info = Metadata::builder()
            .level(Level::Info)
            .target("retro_curate_cli")
            .build();
        let warn = Metadata::builder()
            .level(Level::Warn)
            .target("retro_curate_cli")
            .build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&warn));
    }

    #[test]
    fn test_log_file_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = CliLogger::new(Verbosity::Info, false, Some(&path)).unwrap();
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("retro_curate_cli")
                .args(format_args!("\u{1b}[1mhello\u{1b}[0m"))
                .build(),
        );
        logger.flush();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello\n");
    }
}
