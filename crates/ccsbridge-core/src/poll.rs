// ── Session/poll state machine ──
//
// One poll step takes the owned `PollState`, talks to the device at most
// once, and hands the state back together with what the host should be
// told. The step itself knows nothing about timers or hosts, so it can be
// driven tick by tick from tests.

use std::future::Future;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use ccsbridge_api::{DeviceClient, Error as ApiError, SessionToken, Speaker};

use crate::config::BridgeConfig;
use crate::model::{NO_ACTIVE_MIC, SpeakerRecord, SpeakerSnapshot, main_speaker};
use crate::session::Session;

// ── DeviceApi ────────────────────────────────────────────────────

/// The two device calls the poll loop needs.
///
/// Implemented by [`DeviceClient`]; tests substitute scripted devices.
pub trait DeviceApi: Send + Sync + 'static {
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<SessionToken, ApiError>> + Send;

    fn list_speakers(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Vec<Speaker>, ApiError>> + Send;
}

impl DeviceApi for DeviceClient {
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<SessionToken, ApiError>> + Send {
        DeviceClient::login(self, username, password)
    }

    fn list_speakers(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Vec<Speaker>, ApiError>> + Send {
        DeviceClient::list_speakers(self, token)
    }
}

// ── Step results ─────────────────────────────────────────────────

/// Something the host must be told after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// New value for the `active_mic` variable.
    ActiveMic(u32),
    /// Feedback inputs may have changed; re-evaluate all feedbacks.
    Feedbacks,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    LoggedIn,
    LoginFailed,
    Polled,
    SessionExpired,
    PollFailed,
}

#[derive(Debug)]
pub struct StepResult {
    pub state: PollState,
    pub outcome: StepOutcome,
    pub publications: Vec<Publication>,
}

// ── PollState ────────────────────────────────────────────────────

/// Everything the poll loop remembers between ticks.
#[derive(Debug, Default)]
pub struct PollState {
    pub session: Session,
    /// Speakers from the last successful fetch, in device order.
    pub speakers: Vec<SpeakerRecord>,
    /// Main speaker id last published to the host.
    pub active_mic: Option<u32>,
    /// Number of steps taken.
    pub ticks: u64,
}

impl PollState {
    pub fn snapshot(&self) -> SpeakerSnapshot {
        SpeakerSnapshot {
            logged_in: self.session.is_logged_in(),
            speakers: self.speakers.clone(),
            active_mic: self.active_mic,
        }
    }

    /// Record the result of a login attempt.
    pub fn apply_login(&mut self, result: Result<SessionToken, ApiError>) -> StepOutcome {
        match result {
            Ok(token) => {
                info!("device login successful");
                self.session.establish(token);
                StepOutcome::LoggedIn
            }
            Err(e) => {
                warn!(error = %e, "device login failed");
                StepOutcome::LoginFailed
            }
        }
    }

    /// Record the result of a speaker fetch.
    ///
    /// The speaker list is replaced wholesale. `active_mic` is only
    /// published when the main speaker id actually changes.
    pub fn apply_speakers(
        &mut self,
        result: Result<Vec<Speaker>, ApiError>,
    ) -> (StepOutcome, Vec<Publication>) {
        let speakers = match result {
            Ok(speakers) => speakers,
            Err(ApiError::SessionExpired) => {
                warn!("device rejected session (401), logging in again on next tick");
                self.session.invalidate();
                return (StepOutcome::SessionExpired, vec![Publication::Feedbacks]);
            }
            Err(e) => {
                warn!(error = %e, "speaker poll failed, logging in again on next tick");
                self.session.invalidate();
                return (StepOutcome::PollFailed, vec![Publication::Feedbacks]);
            }
        };

        let mut publications = Vec::with_capacity(2);
        self.speakers = speakers.into_iter().map(SpeakerRecord::from).collect();

        match main_speaker(&self.speakers) {
            Some(main) => {
                if self.active_mic != Some(main.id) {
                    info!(mic = main.id, name = %main.name, "main speaker changed");
                    self.active_mic = Some(main.id);
                    publications.push(Publication::ActiveMic(main.id));
                }
            }
            None => {
                if self.active_mic.take().is_some() {
                    info!("no active speakers");
                    publications.push(Publication::ActiveMic(NO_ACTIVE_MIC));
                }
            }
        }

        debug!(
            speakers = self.speakers.len(),
            active_mic = self.active_mic.unwrap_or(NO_ACTIVE_MIC),
            "speaker poll complete"
        );

        publications.push(Publication::Feedbacks);
        (StepOutcome::Polled, publications)
    }
}

// ── poll_step ────────────────────────────────────────────────────

/// Run one tick: log in when there is no session, otherwise fetch speakers.
///
/// Never fails; device errors end up as a logged-out state that the next
/// tick recovers from.
pub async fn poll_step<D: DeviceApi>(
    device: &D,
    config: &BridgeConfig,
    mut state: PollState,
) -> StepResult {
    state.ticks += 1;

    let Some(token) = state.session.token().cloned() else {
        let result = device.login(&config.username, &config.password).await;
        let outcome = state.apply_login(result);
        let publications = if outcome == StepOutcome::LoggedIn {
            vec![Publication::Feedbacks]
        } else {
            Vec::new()
        };
        return StepResult {
            state,
            outcome,
            publications,
        };
    };

    let result = device.list_speakers(&token).await;
    let (outcome, publications) = state.apply_speakers(result);
    StepResult {
        state,
        outcome,
        publications,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn speaker(id: u32, prio: bool) -> Speaker {
        Speaker {
            id,
            name: format!("Seat {id}"),
            prio,
        }
    }

    fn logged_in() -> PollState {
        let mut state = PollState::default();
        state.session.establish(SessionToken::new("tok"));
        state
    }

    #[test]
    fn first_non_empty_poll_publishes_main_speaker() {
        let mut state = logged_in();
        let (outcome, pubs) = state.apply_speakers(Ok(vec![speaker(3, false), speaker(5, true)]));

        assert_eq!(outcome, StepOutcome::Polled);
        assert_eq!(pubs, vec![Publication::ActiveMic(5), Publication::Feedbacks]);
        assert_eq!(state.active_mic, Some(5));
        assert_eq!(state.speakers.len(), 2);
    }

    #[test]
    fn unchanged_main_speaker_publishes_feedbacks_only() {
        let mut state = logged_in();
        state.apply_speakers(Ok(vec![speaker(3, false)]));

        // Different list, same main speaker.
        let (_, pubs) = state.apply_speakers(Ok(vec![speaker(3, false), speaker(8, false)]));
        assert_eq!(pubs, vec![Publication::Feedbacks]);
        assert_eq!(state.speakers.len(), 2);
    }

    #[test]
    fn empty_after_non_empty_publishes_zero_once() {
        let mut state = logged_in();
        state.apply_speakers(Ok(vec![speaker(3, false)]));

        let (_, pubs) = state.apply_speakers(Ok(vec![]));
        assert_eq!(pubs, vec![Publication::ActiveMic(0), Publication::Feedbacks]);
        assert_eq!(state.active_mic, None);
        assert!(state.speakers.is_empty());

        let (_, pubs) = state.apply_speakers(Ok(vec![]));
        assert_eq!(pubs, vec![Publication::Feedbacks]);
    }

    #[test]
    fn empty_from_start_publishes_nothing_for_variable() {
        let mut state = logged_in();
        let (_, pubs) = state.apply_speakers(Ok(vec![]));
        assert_eq!(pubs, vec![Publication::Feedbacks]);
    }

    #[test]
    fn unauthorized_invalidates_session_but_keeps_speakers() {
        let mut state = logged_in();
        state.apply_speakers(Ok(vec![speaker(3, false)]));

        let (outcome, pubs) = state.apply_speakers(Err(ApiError::SessionExpired));
        assert_eq!(outcome, StepOutcome::SessionExpired);
        assert_eq!(pubs, vec![Publication::Feedbacks]);
        assert!(!state.session.is_logged_in());
        assert_eq!(state.active_mic, Some(3));
        assert_eq!(state.speakers.len(), 1);
    }

    #[test]
    fn transport_failure_invalidates_session() {
        let mut state = logged_in();
        let (outcome, _) = state.apply_speakers(Err(ApiError::Timeout { timeout_ms: 5000 }));
        assert_eq!(outcome, StepOutcome::PollFailed);
        assert!(!state.session.is_logged_in());
    }

    #[test]
    fn failed_login_stays_logged_out() {
        let mut state = PollState::default();
        let outcome = state.apply_login(Err(ApiError::Authentication {
            message: "nope".into(),
        }));
        assert_eq!(outcome, StepOutcome::LoginFailed);
        assert!(!state.session.is_logged_in());

        let outcome = state.apply_login(Ok(SessionToken::new("t")));
        assert_eq!(outcome, StepOutcome::LoggedIn);
        assert!(state.snapshot().logged_in);
    }
}
