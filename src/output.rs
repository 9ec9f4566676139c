use std::io::{self, Write};

use crate::app::{EventKind, ProgressEvent, ProgressSink};

/// Prints progress to stdout: top-level steps flush left, details indented,
/// failures flagged with `!`.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn format(event: &ProgressEvent) -> String {
        match event.kind {
            EventKind::Step => event.message.clone(),
            EventKind::Detail => format!("  {}", event.message),
            EventKind::Failure => format!("! {}", event.message),
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{}", Self::format(&event)) {
            tracing::debug!(error = %err, "failed to write progress line");
        }
    }
}
