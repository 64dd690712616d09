// ── Bridge lifecycle ──
//
// Host-facing lifecycle for one device connection: init, config updates,
// actions, feedback queries and destroy. Polling runs in a single
// background task; commands reach it over a channel and are handled
// between poll steps, so steps never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use ccsbridge_api::{DeviceClient, TransportConfig};

use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::host::{Host, InstanceStatus};
use crate::model::{NO_ACTIVE_MIC, SpeakerSnapshot};
use crate::poll::{DeviceApi, PollState, Publication, poll_step};
use crate::surface::{
    self, ActionId, FeedbackId, FeedbackOptions, VariableId, action_definitions,
    all_feedback_ids, feedback_definitions, variable_definitions,
};

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Builds a device client for a validated config.
pub type Connector<D> = Arc<dyn Fn(&BridgeConfig) -> Result<D, CoreError> + Send + Sync>;

// ── BridgeState ──────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No valid config yet (or the last update was invalid). Not polling.
    Uninitialized,
    /// Valid config, poll timer armed.
    Ready,
    /// Destroyed. Terminal.
    Stopped,
}

enum PollCommand<D> {
    Reconfigure {
        config: BridgeConfig,
        /// Present when host or credentials changed.
        device: Option<D>,
    },
    Relogin,
    PollNow,
}

struct Worker<D> {
    commands: mpsc::Sender<PollCommand<D>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<D> Worker<D> {
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!(error = %e, "poll task ended abnormally");
        }
    }
}

struct Lifecycle<D> {
    state: BridgeState,
    config: Option<BridgeConfig>,
    worker: Option<Worker<D>>,
}

// ── Bridge ───────────────────────────────────────────────────────

/// One device connection exposed to a panel host.
///
/// Cheaply cloneable via `Arc<BridgeInner>`.
pub struct Bridge<D: DeviceApi> {
    inner: Arc<BridgeInner<D>>,
}

impl<D: DeviceApi> Clone for Bridge<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct BridgeInner<D> {
    host: Arc<dyn Host>,
    connect: Connector<D>,
    lifecycle: Mutex<Lifecycle<D>>,
    snapshot: Arc<watch::Sender<SpeakerSnapshot>>,
}

impl Bridge<DeviceClient> {
    /// Bridge talking HTTP to the configured device.
    pub fn new(host: Arc<dyn Host>, transport: TransportConfig) -> Self {
        Self::with_connector(host, move |config: &BridgeConfig| {
            Ok(DeviceClient::new(&config.host, &transport)?)
        })
    }
}

impl<D: DeviceApi> Bridge<D> {
    /// Bridge with a custom device factory.
    pub fn with_connector(
        host: Arc<dyn Host>,
        connect: impl Fn(&BridgeConfig) -> Result<D, CoreError> + Send + Sync + 'static,
    ) -> Self {
        let (snapshot, _) = watch::channel(SpeakerSnapshot::default());
        Self {
            inner: Arc::new(BridgeInner {
                host,
                connect: Arc::new(connect),
                lifecycle: Mutex::new(Lifecycle {
                    state: BridgeState::Uninitialized,
                    config: None,
                    worker: None,
                }),
                snapshot: Arc::new(snapshot),
            }),
        }
    }

    pub async fn state(&self) -> BridgeState {
        self.inner.lifecycle.lock().await.state
    }

    /// The last accepted config, valid or not.
    pub async fn config(&self) -> Option<BridgeConfig> {
        self.inner.lifecycle.lock().await.config.clone()
    }

    /// Latest poll result.
    pub fn snapshot(&self) -> SpeakerSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receive a new snapshot after every poll step.
    pub fn subscribe(&self) -> watch::Receiver<SpeakerSnapshot> {
        self.inner.snapshot.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Accept the initial config, export definitions and start polling.
    ///
    /// An invalid config reports bad-config status to the host and leaves
    /// the bridge uninitialised.
    pub async fn init(&self, config: BridgeConfig) -> Result<(), CoreError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.state == BridgeState::Stopped {
            return Err(CoreError::Stopped);
        }

        if let Some(worker) = lifecycle.worker.take() {
            worker.stop().await;
            self.clear_published();
        }

        let result = self.start(&mut lifecycle, config);
        if result.is_ok() {
            self.export_definitions();
        }
        result
    }

    /// Apply a new config while running.
    ///
    /// Invalid configs stop polling and report bad config. A host or
    /// credential change drops the device session so the next tick logs
    /// in again with the new settings; an interval change re-arms the timer.
    pub async fn config_updated(&self, config: BridgeConfig) -> Result<(), CoreError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.state == BridgeState::Stopped {
            return Err(CoreError::Stopped);
        }

        if lifecycle.worker.is_none() {
            let result = self.start(&mut lifecycle, config);
            if result.is_ok() {
                self.export_definitions();
            }
            return result;
        }

        if let Err(e) = config.validate() {
            lifecycle.config = Some(config);
            self.reject(&mut lifecycle, &e.to_string()).await;
            return Err(e.into());
        }

        let connection_changed = lifecycle
            .config
            .as_ref()
            .is_none_or(|current| current.connection_changed(&config));

        let device = if connection_changed {
            match (self.inner.connect)(&config) {
                Ok(device) => Some(device),
                Err(e) => {
                    lifecycle.config = Some(config);
                    self.reject(&mut lifecycle, &e.to_string()).await;
                    return Err(e);
                }
            }
        } else {
            None
        };

        if let Some(worker) = lifecycle.worker.as_ref() {
            let command = PollCommand::Reconfigure {
                config: config.clone(),
                device,
            };
            if worker.commands.send(command).await.is_err() {
                return Err(CoreError::NotRunning);
            }
        }

        lifecycle.config = Some(config);
        self.inner.host.update_status(&InstanceStatus::Ok);
        Ok(())
    }

    /// Stop polling for good. Safe to call more than once.
    ///
    /// An in-flight request is allowed to finish; nothing is sent afterwards.
    pub async fn destroy(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.state == BridgeState::Stopped {
            return;
        }
        if let Some(worker) = lifecycle.worker.take() {
            worker.stop().await;
        }
        lifecycle.state = BridgeState::Stopped;
        debug!("bridge destroyed");
    }

    // ── Host callbacks ───────────────────────────────────────────

    pub async fn execute_action(&self, action: ActionId) -> Result<(), CoreError> {
        let lifecycle = self.inner.lifecycle.lock().await;
        if lifecycle.state == BridgeState::Stopped {
            return Err(CoreError::Stopped);
        }
        let worker = lifecycle.worker.as_ref().ok_or(CoreError::NotRunning)?;

        let command = match action {
            ActionId::Relogin => PollCommand::Relogin,
            ActionId::PollNow => PollCommand::PollNow,
        };
        debug!(%action, "executing action");
        worker
            .commands
            .send(command)
            .await
            .map_err(|_| CoreError::NotRunning)
    }

    pub fn evaluate_feedback(&self, feedback: FeedbackId, options: FeedbackOptions) -> bool {
        surface::evaluate_feedback(feedback, options, &self.inner.snapshot.borrow())
    }

    // ── Internals ────────────────────────────────────────────────

    /// Validate, build a device client and spawn the poll task.
    fn start(&self, lifecycle: &mut Lifecycle<D>, config: BridgeConfig) -> Result<(), CoreError> {
        let device = config
            .validate()
            .map_err(CoreError::from)
            .and_then(|()| (self.inner.connect)(&config));

        let device = match device {
            Ok(device) => device,
            Err(e) => {
                error!(error = %e, "rejecting bridge config");
                self.inner
                    .host
                    .update_status(&InstanceStatus::BadConfig(config_reason(&e)));
                lifecycle.config = Some(config);
                lifecycle.state = BridgeState::Uninitialized;
                return Err(e);
            }
        };

        self.inner.host.update_status(&InstanceStatus::Ok);

        let (commands, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        self.inner.snapshot.send_replace(SpeakerSnapshot::default());

        let handle = tokio::spawn(poll_task(
            device,
            config.clone(),
            Arc::clone(&self.inner.host),
            Arc::clone(&self.inner.snapshot),
            rx,
            cancel.clone(),
        ));

        info!(
            host = %config.host,
            interval_ms = config.poll_interval_ms(),
            "polling started"
        );

        lifecycle.worker = Some(Worker {
            commands,
            cancel,
            handle,
        });
        lifecycle.config = Some(config);
        lifecycle.state = BridgeState::Ready;
        Ok(())
    }

    /// Stop polling and report bad config.
    async fn reject(&self, lifecycle: &mut Lifecycle<D>, reason: &str) {
        error!(reason, "rejecting bridge config");
        if let Some(worker) = lifecycle.worker.take() {
            worker.stop().await;
            self.clear_published();
        }
        lifecycle.state = BridgeState::Uninitialized;
        self.inner
            .host
            .update_status(&InstanceStatus::BadConfig(reason.to_owned()));
    }

    /// Forget the stopped task's session and speakers so feedbacks and
    /// `active_mic` stop reflecting them.
    fn clear_published(&self) {
        let previous = self.inner.snapshot.send_replace(SpeakerSnapshot::default());
        if previous.active_mic.is_some() {
            self.inner
                .host
                .set_variable_value(VariableId::ActiveMic, NO_ACTIVE_MIC);
        }
        self.inner.host.check_feedbacks(&all_feedback_ids());
    }

    fn export_definitions(&self) {
        let host = &self.inner.host;
        host.set_action_definitions(&action_definitions());
        host.set_feedback_definitions(&feedback_definitions());
        host.set_variable_definitions(&variable_definitions());
        host.set_variable_value(VariableId::ActiveMic, NO_ACTIVE_MIC);
    }
}

/// Status text for a rejected config: the bare validation message when
/// there is one.
fn config_reason(err: &CoreError) -> String {
    match err {
        CoreError::Config(e) => e.to_string(),
        other => other.to_string(),
    }
}

// ── Poll task ────────────────────────────────────────────────────

enum Event<D> {
    Stop,
    Command(Option<PollCommand<D>>),
    Tick,
}

fn poll_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Drive poll steps from the timer and from commands, one at a time.
async fn poll_task<D: DeviceApi>(
    mut device: D,
    mut config: BridgeConfig,
    host: Arc<dyn Host>,
    snapshot: Arc<watch::Sender<SpeakerSnapshot>>,
    mut commands: mpsc::Receiver<PollCommand<D>>,
    cancel: CancellationToken,
) {
    let mut state = PollState::default();
    let mut interval = poll_interval(config.poll_interval);

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => Event::Stop,
            command = commands.recv() => Event::Command(command),
            _ = interval.tick() => Event::Tick,
        };

        let run_step = match event {
            Event::Stop | Event::Command(None) => break,
            Event::Tick | Event::Command(Some(PollCommand::PollNow)) => true,
            Event::Command(Some(PollCommand::Relogin)) => {
                info!("relogin requested");
                state.session.invalidate();
                publish(host.as_ref(), &snapshot, &state, &[Publication::Feedbacks]);
                false
            }
            Event::Command(Some(PollCommand::Reconfigure {
                config: next,
                device: next_device,
            })) => {
                if let Some(next_device) = next_device {
                    info!(host = %next.host, "connection settings changed, logging in again");
                    device = next_device;
                    state.session.invalidate();
                    publish(host.as_ref(), &snapshot, &state, &[Publication::Feedbacks]);
                }
                if next.poll_interval != config.poll_interval {
                    debug!(interval_ms = next.poll_interval_ms(), "poll interval changed");
                    interval = poll_interval(next.poll_interval);
                }
                config = next;
                false
            }
        };

        if run_step {
            let result = poll_step(&device, &config, state).await;
            state = result.state;
            if cancel.is_cancelled() {
                break;
            }
            publish(host.as_ref(), &snapshot, &state, &result.publications);
        }
    }

    debug!(ticks = state.ticks, "poll task stopped");
}

fn publish(
    host: &dyn Host,
    snapshot: &watch::Sender<SpeakerSnapshot>,
    state: &PollState,
    publications: &[Publication],
) {
    snapshot.send_replace(state.snapshot());
    for publication in publications {
        match publication {
            Publication::ActiveMic(value) => host.set_variable_value(VariableId::ActiveMic, *value),
            Publication::Feedbacks => host.check_feedbacks(&all_feedback_ids()),
        }
    }
}
