// ── Panel host boundary ──
//
// The control-surface application that embeds the bridge. It owns the
// buttons, the variable store and the status indicator; the bridge only
// pushes definitions, values and status into it.

use std::fmt;

use serde::Serialize;

use crate::surface::{
    ActionDefinition, FeedbackDefinition, FeedbackId, VariableDefinition, VariableId,
};

/// Connection status shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum InstanceStatus {
    Ok,
    BadConfig(String),
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::BadConfig(reason) => write!(f, "bad config: {reason}"),
        }
    }
}

/// Registration and update API of the panel host.
///
/// Calls arrive from the bridge's poll task as well as from the caller of
/// [`Bridge`](crate::Bridge) methods, so implementations must be thread-safe.
pub trait Host: Send + Sync + 'static {
    fn update_status(&self, status: &InstanceStatus);

    fn set_variable_definitions(&self, definitions: &[VariableDefinition]);

    fn set_action_definitions(&self, definitions: &[ActionDefinition]);

    fn set_feedback_definitions(&self, definitions: &[FeedbackDefinition]);

    fn set_variable_value(&self, variable: VariableId, value: u32);

    /// Ask the host to re-evaluate the given feedbacks.
    fn check_feedbacks(&self, feedbacks: &[FeedbackId]);
}
