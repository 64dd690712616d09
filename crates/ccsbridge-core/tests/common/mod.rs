// Shared fakes for core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;

use ccsbridge_api::{Error as ApiError, SessionToken, Speaker};
use ccsbridge_core::{
    ActionDefinition, DeviceApi, FeedbackDefinition, FeedbackId, Host, InstanceStatus,
    VariableDefinition, VariableId,
};

// ── Scripted device ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login { host: String, username: String },
    Speakers { host: String, token: String },
}

#[derive(Default)]
struct Script {
    logins: VecDeque<Result<SessionToken, ApiError>>,
    speakers: VecDeque<Result<Vec<Speaker>, ApiError>>,
    calls: Vec<Call>,
    issued: u32,
}

/// Device fake shared by every client the connector builds.
///
/// Unscripted logins succeed with `tok-N`; unscripted fetches return an
/// empty list.
#[derive(Clone, Default)]
pub struct ScriptedDevice {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDevice {
    pub fn push_login(&self, result: Result<SessionToken, ApiError>) {
        self.script.lock().unwrap().logins.push_back(result);
    }

    pub fn push_speakers(&self, result: Result<Vec<Speaker>, ApiError>) {
        self.script.lock().unwrap().speakers.push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    /// A client bound to `host`, sharing this script.
    pub fn client(&self, host: &str) -> ScriptedClient {
        ScriptedClient {
            host: host.to_owned(),
            device: self.clone(),
        }
    }
}

pub struct ScriptedClient {
    host: String,
    device: ScriptedDevice,
}

impl DeviceApi for ScriptedClient {
    fn login(
        &self,
        username: &str,
        _password: &SecretString,
    ) -> impl Future<Output = Result<SessionToken, ApiError>> + Send {
        let mut script = self.device.script.lock().unwrap();
        script.calls.push(Call::Login {
            host: self.host.clone(),
            username: username.to_owned(),
        });
        let result = script.logins.pop_front().unwrap_or_else(|| {
            script.issued += 1;
            Ok(SessionToken::new(format!("tok-{}", script.issued)))
        });
        ready(result)
    }

    fn list_speakers(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Vec<Speaker>, ApiError>> + Send {
        let mut script = self.device.script.lock().unwrap();
        script.calls.push(Call::Speakers {
            host: self.host.clone(),
            token: token.expose().to_owned(),
        });
        ready(script.speakers.pop_front().unwrap_or_else(|| Ok(Vec::new())))
    }
}

pub fn speaker(id: u32, prio: bool) -> Speaker {
    Speaker {
        id,
        name: format!("Seat {id}"),
        prio,
    }
}

// ── Recording host ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Status(InstanceStatus),
    Definitions,
    Variable(VariableId, u32),
    Feedbacks,
}

#[derive(Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<InstanceStatus> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<InstanceStatus> {
        self.statuses().pop()
    }

    /// Every value written to `active_mic`, in order.
    pub fn active_mic_values(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Variable(VariableId::ActiveMic, v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn feedback_checks(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == HostEvent::Feedbacks)
            .count()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Host for RecordingHost {
    fn update_status(&self, status: &InstanceStatus) {
        self.record(HostEvent::Status(status.clone()));
    }

    fn set_variable_definitions(&self, _definitions: &[VariableDefinition]) {
        self.record(HostEvent::Definitions);
    }

    fn set_action_definitions(&self, _definitions: &[ActionDefinition]) {}

    fn set_feedback_definitions(&self, _definitions: &[FeedbackDefinition]) {}

    fn set_variable_value(&self, variable: VariableId, value: u32) {
        self.record(HostEvent::Variable(variable, value));
    }

    fn check_feedbacks(&self, _feedbacks: &[FeedbackId]) {
        self.record(HostEvent::Feedbacks);
    }
}
