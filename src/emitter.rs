use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::Path;
use tracing::warn;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sink for user-facing log records.
pub trait Emitter {
    fn emit(&mut self, message: &str);
}

/// Renders one record line, without the trailing newline.
pub fn format_line(at: DateTime<Local>, message: &str) -> String {
    format!("[{}] {}", at.format(TIMESTAMP_FORMAT), message)
}

/// Writes every record to the console and, when enabled, appends it to a
/// log file that stays open until the emitter is dropped.
pub struct LogEmitter<W: Write = Stdout> {
    console: W,
    file: Option<File>,
}

impl LogEmitter<Stdout> {
    pub fn open(log_file: Option<&Path>) -> Result<Self> {
        Self::with_console(io::stdout(), log_file)
    }
}

impl<W: Write> LogEmitter<W> {
    pub fn with_console(console: W, log_file: Option<&Path>) -> Result<Self> {
        let file = log_file
            .map(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))
            })
            .transpose()?;

        Ok(LogEmitter { console, file })
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    fn write_console(&mut self, line: &str) {
        // Console output is best-effort; a closed stdout must not stop the monitor.
        let _ = self.console.write_all(line.as_bytes());
        let _ = self.console.flush();
    }
}

impl<W: Write> Emitter for LogEmitter<W> {
    fn emit(&mut self, message: &str) {
        let line = format!("{}\n", format_line(Local::now(), message));
        self.write_console(&line);

        let Some(file) = self.file.as_mut() else {
            return;
        };

        if let Err(e) = file.write_all(line.as_bytes()) {
            warn!("Failed to write to log file: {}", e);
            self.write_console(&format!("Failed to write to log file: {}\n", e));
        }
    }
}
