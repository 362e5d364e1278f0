use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod timer;

pub use timer::ProgramTimer;

/// Process-wide logging verbosity
///
/// `Minimum` keeps failures only, `Normal` adds successful authentications
/// and `Maximum` adds successful directory searches. Each maps onto a
/// tracing level for the `authgate*` crates: warn, info and debug.
/// Dependencies stay at warn whatever the verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Minimum,
    #[default]
    Normal,
    Maximum,
}

impl Verbosity {
    /// Parse a level name; anything unrecognized is `Normal`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "minimum" => Verbosity::Minimum,
            "maximum" => Verbosity::Maximum,
            _ => Verbosity::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Minimum => "minimum",
            Verbosity::Normal => "normal",
            Verbosity::Maximum => "maximum",
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    ///
    /// Targets match by prefix, so `authgate` covers every workspace crate.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Minimum => "warn",
            Verbosity::Normal => "warn,authgate=info",
            Verbosity::Maximum => "warn,authgate=debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verbosity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Verbosity::parse(&name))
    }
}

/// Everything `init` needs, built once from the config file
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Printed in brackets after the timestamp
    pub program: String,
    pub verbosity: Verbosity,
    /// Write to stdout
    pub console: bool,
    /// Append to this file
    pub logfile: Option<PathBuf>,
}

/// Initialize the tracing system
///
/// `RUST_LOG` overrides the configured verbosity. Events go to stdout, the
/// log file, both, or nowhere. A log file that cannot be opened is reported
/// on stderr and skipped.
pub fn init(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.verbosity.directive()))?;

    let fmt_layer = tfmt::layer()
        .with_writer(make_writer(settings))
        .with_ansi(false)
        .with_timer(ProgramTimer::new(&settings.program))
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn make_writer(settings: &LogSettings) -> BoxMakeWriter {
    let file = settings.logfile.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("cannot open log file '{}': {e}", path.display());
                None
            }
        }
    });

    match (settings.console, file) {
        (true, Some(file)) => BoxMakeWriter::new(std::io::stdout.and(Mutex::new(file))),
        (false, Some(file)) => BoxMakeWriter::new(Mutex::new(file)),
        (true, None) => BoxMakeWriter::new(std::io::stdout),
        (false, None) => BoxMakeWriter::new(std::io::sink),
    }
}
