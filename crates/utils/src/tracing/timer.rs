use chrono::Local;
use std::fmt;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

/// Local timestamp followed by the bracketed program name
#[derive(Debug, Clone, Default)]
pub struct ProgramTimer {
    program: String,
}

impl ProgramTimer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl FormatTime for ProgramTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = Local::now().format("%Y/%m/%d %H:%M:%S");
        if self.program.is_empty() {
            write!(w, "{now}")
        } else {
            write!(w, "{now} [{}]", self.program)
        }
    }
}
