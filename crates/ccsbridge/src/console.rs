//! Terminal panel host used by `ccsbridge watch`.
//!
//! Stands in for the control-surface application: status changes and
//! variable writes are printed as timestamped lines, or as one JSON object
//! per line when a JSON output format is selected.

use std::io::{self, Write};

use chrono::{Local, SecondsFormat};
use owo_colors::OwoColorize;
use serde::Serialize;

use ccsbridge_core::{
    ActionDefinition, FeedbackDefinition, FeedbackId, Host, InstanceStatus, VariableDefinition,
    VariableId,
};

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Human { color: bool },
    JsonLines,
}

/// One line of `watch` output in JSON mode.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ConsoleEvent<'a> {
    Status {
        at: String,
        #[serde(flatten)]
        status: &'a InstanceStatus,
    },
    Variable {
        at: String,
        variable: VariableId,
        value: u32,
    },
}

pub struct ConsoleHost {
    style: Style,
    quiet: bool,
}

impl ConsoleHost {
    pub fn new(format: OutputFormat, color: bool, quiet: bool) -> Self {
        let style = match format {
            OutputFormat::Json | OutputFormat::JsonCompact => Style::JsonLines,
            OutputFormat::Table | OutputFormat::Yaml | OutputFormat::Plain => Style::Human { color },
        };
        Self { style, quiet }
    }

    fn emit(&self, event: &ConsoleEvent<'_>, human: impl FnOnce(bool) -> String) {
        if self.quiet {
            return;
        }
        let line = match self.style {
            Style::JsonLines => match serde_json::to_string(event) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "could not encode console event");
                    return;
                }
            },
            Style::Human { color } => human(color),
        };
        if let Err(e) = write_line(&mut io::stdout().lock(), &line) {
            tracing::debug!(error = %e, "could not write console event");
        }
    }
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<()> {
    writeln!(out, "{line}")?;
    out.flush()
}

fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

fn human_status(at: &str, status: &InstanceStatus, color: bool) -> String {
    let label = status.to_string();
    let label = match (status, color) {
        (InstanceStatus::Ok, true) => label.green().bold().to_string(),
        (InstanceStatus::BadConfig(_), true) => label.red().bold().to_string(),
        (_, false) => label,
    };
    format!("{at}  status      {label}")
}

fn human_variable(at: &str, variable: VariableId, value: u32, color: bool) -> String {
    let value = if color && value != 0 {
        value.cyan().bold().to_string()
    } else {
        value.to_string()
    };
    format!("{at}  {:<11} {value}", variable.as_ref())
}

impl Host for ConsoleHost {
    fn update_status(&self, status: &InstanceStatus) {
        let at = timestamp();
        self.emit(
            &ConsoleEvent::Status {
                at: at.clone(),
                status,
            },
            |color| human_status(&at, status, color),
        );
    }

    fn set_variable_definitions(&self, definitions: &[VariableDefinition]) {
        tracing::debug!(count = definitions.len(), "variable definitions registered");
    }

    fn set_action_definitions(&self, definitions: &[ActionDefinition]) {
        tracing::debug!(count = definitions.len(), "action definitions registered");
    }

    fn set_feedback_definitions(&self, definitions: &[FeedbackDefinition]) {
        tracing::debug!(count = definitions.len(), "feedback definitions registered");
    }

    fn set_variable_value(&self, variable: VariableId, value: u32) {
        let at = timestamp();
        self.emit(
            &ConsoleEvent::Variable {
                at: at.clone(),
                variable,
                value,
            },
            |color| human_variable(&at, variable, value, color),
        );
    }

    fn check_feedbacks(&self, feedbacks: &[FeedbackId]) {
        tracing::trace!(?feedbacks, "feedback re-evaluation requested");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_have_no_escape_codes() {
        let line = human_variable("t", VariableId::ActiveMic, 7, false);
        assert_eq!(line, "t  active_mic  7");
        assert!(!human_status("t", &InstanceStatus::Ok, false).contains('\u{1b}'));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_reported_not_swallowed() {
        let err = write_line(&mut ClosedPipe, "t  active_mic  7").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let mut buf = Vec::new();
        write_line(&mut buf, "t  active_mic  7").unwrap();
        assert_eq!(buf, b"t  active_mic  7\n");
    }

    #[test]
    fn colored_status_is_highlighted() {
        let line = human_status("t", &InstanceStatus::BadConfig("x".into()), true);
        assert!(line.contains('\u{1b}'));
        assert!(line.contains("bad config: x"));
    }

    #[test]
    fn json_event_carries_status_fields() {
        let status = InstanceStatus::BadConfig("Server IP is required".into());
        let event = ConsoleEvent::Status {
            at: "t".into(),
            status: &status,
        };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "status");
        assert_eq!(value["status"], "bad_config");
        assert_eq!(value["message"], "Server IP is required");
    }
}
