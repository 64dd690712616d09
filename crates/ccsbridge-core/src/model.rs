// ── Speaker domain model ──
//
// Speaker records as the bridge sees them, plus main-speaker selection.

use serde::Serialize;

use ccsbridge_api::Speaker;

/// Variable value meaning "no active microphone".
pub const NO_ACTIVE_MIC: u32 = 0;

/// One microphone that currently has the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerRecord {
    pub id: u32,
    pub name: String,
    /// Chairman/priority microphone.
    pub priority: bool,
}

impl From<Speaker> for SpeakerRecord {
    fn from(s: Speaker) -> Self {
        Self {
            id: s.id,
            name: s.name,
            priority: s.prio,
        }
    }
}

/// Pick the main speaker: the first priority microphone, otherwise the
/// first entry in device order. `None` for an empty list.
pub fn main_speaker(speakers: &[SpeakerRecord]) -> Option<&SpeakerRecord> {
    speakers
        .iter()
        .find(|s| s.priority)
        .or_else(|| speakers.first())
}

/// Read-only view of the bridge's latest poll result.
///
/// Published after every poll step so feedbacks can be evaluated
/// at any time without touching the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeakerSnapshot {
    pub logged_in: bool,
    pub speakers: Vec<SpeakerRecord>,
    /// Last published main speaker id, `None` when nobody has the floor.
    pub active_mic: Option<u32>,
}

impl SpeakerSnapshot {
    pub fn is_speaking(&self, mic: u32) -> bool {
        self.speakers.iter().any(|s| s.id == mic)
    }

    pub fn is_main_speaker(&self, mic: u32) -> bool {
        self.active_mic == Some(mic)
    }

    /// `active_mic` as the host variable value.
    pub fn active_mic_value(&self) -> u32 {
        self.active_mic.unwrap_or(NO_ACTIVE_MIC)
    }
}
