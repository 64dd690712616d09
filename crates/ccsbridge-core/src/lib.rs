// ccsbridge-core: Session/poll state machine between the device API and a panel host.

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod poll;
pub mod session;
pub mod surface;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{Bridge, BridgeState};
pub use config::{BridgeConfig, ConfigError};
pub use error::CoreError;
pub use host::{Host, InstanceStatus};
pub use model::{NO_ACTIVE_MIC, SpeakerRecord, SpeakerSnapshot, main_speaker};
pub use poll::{DeviceApi, PollState, Publication, StepOutcome, StepResult, poll_step};
pub use session::Session;
pub use surface::{
    ActionDefinition, ActionId, FeedbackDefinition, FeedbackId, FeedbackOptions, InputField,
    VariableDefinition, VariableId,
};

// Re-export the device API types consumers need alongside the bridge.
pub use ccsbridge_api::{DeviceClient, SessionToken, Speaker, TransportConfig};
