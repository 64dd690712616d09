// ── Declarative host surface ──
//
// Static descriptions of everything the bridge exports to the panel host:
// the `active_mic` variable, button actions, boolean feedbacks and the
// connection config form. Feedback evaluation against the latest speaker
// snapshot lives here too since it is pure.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::config::{DEFAULT_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
use crate::model::SpeakerSnapshot;

/// Dotted-quad IPv4 pattern used by the host to validate the address field.
pub const IPV4_REGEX: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

// ── Identifiers ──────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariableId {
    ActiveMic,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionId {
    /// Drop the device session and log in again on the next tick.
    Relogin,
    /// Poll immediately instead of waiting for the next tick.
    PollNow,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeedbackId {
    MicActive,
    MainSpeaker,
    LoggedIn,
}

// ── Form inputs ──────────────────────────────────────────────────

/// An input field, used both for the config form and for action/feedback options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputField {
    #[serde(rename = "textinput")]
    TextInput {
        id: &'static str,
        label: &'static str,
        width: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        regex: Option<&'static str>,
    },
    Number {
        id: &'static str,
        label: &'static str,
        width: u8,
        default: u64,
        min: u64,
        max: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        tooltip: Option<&'static str>,
    },
}

impl InputField {
    pub fn id(&self) -> &'static str {
        match self {
            Self::TextInput { id, .. } | Self::Number { id, .. } => id,
        }
    }
}

// ── Definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDefinition {
    pub id: VariableId,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: &'static str,
    pub options: Vec<InputField>,
}

/// Colours a button takes while a boolean feedback is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonStyle {
    pub color: u32,
    pub bgcolor: u32,
}

const ACTIVE_STYLE: ButtonStyle = ButtonStyle {
    color: 0x00FF_FFFF,
    bgcolor: 0x00CC_0000,
};

const CONNECTED_STYLE: ButtonStyle = ButtonStyle {
    color: 0x00FF_FFFF,
    bgcolor: 0x0000_9900,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackDefinition {
    pub id: FeedbackId,
    pub name: &'static str,
    pub description: &'static str,
    pub default_style: ButtonStyle,
    pub options: Vec<InputField>,
}

fn mic_option() -> InputField {
    InputField::Number {
        id: "mic",
        label: "Microphone ID",
        width: 6,
        default: 1,
        min: 1,
        max: u64::from(u16::MAX),
        tooltip: None,
    }
}

impl VariableId {
    pub fn definition(self) -> VariableDefinition {
        match self {
            Self::ActiveMic => VariableDefinition {
                id: self,
                name: "Current active microphone",
            },
        }
    }
}

impl ActionId {
    pub fn definition(self) -> ActionDefinition {
        match self {
            Self::Relogin => ActionDefinition {
                id: self,
                name: "Reconnect to device",
                options: Vec::new(),
            },
            Self::PollNow => ActionDefinition {
                id: self,
                name: "Refresh speakers now",
                options: Vec::new(),
            },
        }
    }
}

impl FeedbackId {
    pub fn definition(self) -> FeedbackDefinition {
        match self {
            Self::MicActive => FeedbackDefinition {
                id: self,
                name: "Microphone is speaking",
                description: "True while the given microphone is in the active speaker list",
                default_style: ACTIVE_STYLE,
                options: vec![mic_option()],
            },
            Self::MainSpeaker => FeedbackDefinition {
                id: self,
                name: "Microphone is main speaker",
                description: "True while the given microphone is the published active microphone",
                default_style: ACTIVE_STYLE,
                options: vec![mic_option()],
            },
            Self::LoggedIn => FeedbackDefinition {
                id: self,
                name: "Connected to device",
                description: "True while the bridge holds a device session",
                default_style: CONNECTED_STYLE,
                options: Vec::new(),
            },
        }
    }
}

pub fn variable_definitions() -> Vec<VariableDefinition> {
    VariableId::iter().map(VariableId::definition).collect()
}

pub fn action_definitions() -> Vec<ActionDefinition> {
    ActionId::iter().map(ActionId::definition).collect()
}

pub fn feedback_definitions() -> Vec<FeedbackDefinition> {
    FeedbackId::iter().map(FeedbackId::definition).collect()
}

pub fn all_feedback_ids() -> Vec<FeedbackId> {
    FeedbackId::iter().collect()
}

/// The connection config form.
pub fn config_fields() -> Vec<InputField> {
    vec![
        InputField::TextInput {
            id: "host",
            label: "Target IP",
            width: 8,
            regex: Some(IPV4_REGEX),
        },
        InputField::TextInput {
            id: "username",
            label: "Username",
            width: 6,
            regex: None,
        },
        InputField::TextInput {
            id: "password",
            label: "Password",
            width: 6,
            regex: None,
        },
        InputField::Number {
            id: "poll_interval_ms",
            label: "Polling Interval (ms)",
            width: 6,
            default: DEFAULT_POLL_INTERVAL_MS,
            min: MIN_POLL_INTERVAL_MS,
            max: MAX_POLL_INTERVAL_MS,
            tooltip: Some(
                "How often to request updates. Lower values are more responsive but increase network traffic.",
            ),
        },
    ]
}

// ── Feedback evaluation ──────────────────────────────────────────

/// Option values the host passes when evaluating a feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FeedbackOptions {
    #[serde(default)]
    pub mic: Option<u32>,
}

impl FeedbackOptions {
    pub fn mic(mic: u32) -> Self {
        Self { mic: Some(mic) }
    }
}

/// Evaluate a boolean feedback. Mic feedbacks without a `mic` option are false.
pub fn evaluate_feedback(
    feedback: FeedbackId,
    options: FeedbackOptions,
    snapshot: &SpeakerSnapshot,
) -> bool {
    match feedback {
        FeedbackId::MicActive => options.mic.is_some_and(|mic| snapshot.is_speaking(mic)),
        FeedbackId::MainSpeaker => options.mic.is_some_and(|mic| snapshot.is_main_speaker(mic)),
        FeedbackId::LoggedIn => snapshot.logged_in,
    }
}
