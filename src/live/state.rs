//! Connection state machine for one live topic.
//!
//! Pure: every input carries the current `Instant` and every output is an
//! [`Effect`] the driver carries out. Nothing here touches a socket or a
//! timer, which keeps the reconnect rules testable.

use std::time::{Duration, Instant};

use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::live::notify::{Level, Notification, NotificationGate, NotifyKind};
use crate::model::live::{LiveMessage, Topic};

pub type ConnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub open_timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            open_timeout: Duration::from_millis(8_000),
            base_delay: Duration::from_millis(800),
            max_delay: Duration::from_millis(12_000),
            max_attempts: 12,
        }
    }
}

impl RetryPolicy {
    /// `min(max_delay, base_delay * 2^(attempt - 1))`, `attempt` counted from 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exp).min(self.max_delay)
    }
}

/// Read-only view published to HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LiveStatus {
    pub state: ConnectionState,
    pub error: Option<String>,
    /// Consecutive failed attempts since the last successful open.
    pub attempts: u32,
    #[schema(value_type = u64)]
    pub connection_id: ConnId,
    /// Set once automatic retries gave up; only a manual reconnect clears it.
    pub auto_retry_stopped: bool,
}

/// Work the driver must perform after an input.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Open(ConnId),
    ArmOpenTimeout(ConnId, Duration),
    Close(ConnId),
    ScheduleRetry(Duration),
    CancelRetry,
    Notify(Notification),
    Deliver(LiveMessage),
}

pub struct LiveState {
    topic: Topic,
    policy: RetryPolicy,
    gate: NotificationGate,
    /// Last id handed out.
    last_id: ConnId,
    /// Socket currently owned and not yet failed. Events from anything
    /// else are stale.
    socket: Option<ConnId>,
    state: ConnectionState,
    error: Option<String>,
    attempts: u32,
    silent: bool,
    retry_pending: bool,
    stopped: bool,
}

impl LiveState {
    pub fn new(topic: Topic, policy: RetryPolicy) -> Self {
        Self {
            topic,
            policy,
            gate: NotificationGate::default(),
            last_id: 0,
            socket: None,
            state: ConnectionState::Offline,
            error: None,
            attempts: 0,
            silent: false,
            retry_pending: false,
            stopped: false,
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn status(&self) -> LiveStatus {
        LiveStatus {
            state: self.state,
            error: self.error.clone(),
            attempts: self.attempts,
            connection_id: self.last_id,
            auto_retry_stopped: self.stopped,
        }
    }

    /// Drop the owned socket and any pending retry without treating it as
    /// a failure.
    fn release(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.retry_pending {
            self.retry_pending = false;
            effects.push(Effect::CancelRetry);
        }
        if let Some(id) = self.socket.take() {
            effects.push(Effect::Close(id));
        }
        effects
    }

    fn owns(&self, id: ConnId) -> bool {
        self.socket == Some(id)
    }

    fn notify(&mut self, now: Instant, kind: NotifyKind, level: Level, title: &str, text: String) -> Vec<Effect> {
        if !self.gate.admit(kind, now) {
            return Vec::new();
        }
        vec![Effect::Notify(Notification {
            kind,
            level,
            title: title.to_string(),
            text,
        })]
    }

    /// Start a fresh attempt. `silent` suppresses the "online" notification
    /// when it succeeds, which automatic retries use.
    pub fn connect(&mut self, silent: bool) -> Vec<Effect> {
        let mut effects = self.release();
        self.last_id += 1;
        let id = self.last_id;
        self.socket = Some(id);
        self.silent = silent;
        self.state = ConnectionState::Connecting;
        self.error = None;
        self.stopped = false;
        effects.push(Effect::Open(id));
        effects.push(Effect::ArmOpenTimeout(id, self.policy.open_timeout));
        effects
    }

    /// Manual reconnect: resets the attempt budget and starts over.
    pub fn reconnect(&mut self) -> Vec<Effect> {
        self.attempts = 0;
        self.connect(false)
    }

    /// Intentional teardown. Produces no notification and no retry.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        let effects = self.release();
        self.state = ConnectionState::Offline;
        self.error = None;
        effects
    }

    pub fn on_open(&mut self, id: ConnId, now: Instant) -> Vec<Effect> {
        if !self.owns(id) || self.state == ConnectionState::Online {
            return Vec::new();
        }
        self.attempts = 0;
        self.state = ConnectionState::Online;
        self.error = None;
        self.stopped = false;
        if self.silent {
            return Vec::new();
        }
        self.notify(
            now,
            NotifyKind::Online,
            Level::Success,
            "Live updates connected",
            format!("{} channel is online", self.topic),
        )
    }

    pub fn on_message(&mut self, id: ConnId, raw: &str) -> Vec<Effect> {
        if !self.owns(id) {
            return Vec::new();
        }
        let msg = LiveMessage::parse(raw);
        if self.topic.accepts(&msg) {
            vec![Effect::Deliver(msg)]
        } else {
            Vec::new()
        }
    }

    /// Socket level error. The close that follows drives the retry.
    pub fn on_error(&mut self, id: ConnId, detail: &str, now: Instant) -> Vec<Effect> {
        if !self.owns(id) {
            return Vec::new();
        }
        self.error = Some(format!("websocket error: {detail}"));
        self.notify(
            now,
            NotifyKind::Error,
            Level::Warning,
            "Live connection error",
            detail.to_string(),
        )
    }

    pub fn on_close(&mut self, id: ConnId, now: Instant) -> Vec<Effect> {
        if !self.owns(id) {
            return Vec::new();
        }
        self.socket = None;

        // Any close that is not already offline is announced, a failed
        // handshake included.
        let mut effects = Vec::new();
        if self.state != ConnectionState::Offline {
            effects.extend(self.notify(
                now,
                NotifyKind::Offline,
                Level::Warning,
                "Live updates dropped",
                format!("{} channel went offline", self.topic),
            ));
        }
        let reason = self.error.take().unwrap_or_else(|| "websocket closed".to_string());
        effects.extend(self.fail(now, reason));
        effects
    }

    pub fn on_open_timeout(&mut self, id: ConnId, now: Instant) -> Vec<Effect> {
        if !self.owns(id) || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.socket = None;

        let mut effects = vec![Effect::Close(id)];
        effects.extend(self.notify(
            now,
            NotifyKind::Timeout,
            Level::Error,
            "Live connection timed out",
            format!("no handshake from {} within {:?}", self.topic.path(), self.policy.open_timeout),
        ));
        effects.extend(self.fail(now, format!("open timed out after {:?}", self.policy.open_timeout)));
        effects
    }

    /// Scheduled retry elapsed. Inert unless a retry is still pending.
    pub fn on_retry_due(&mut self) -> Vec<Effect> {
        if !self.retry_pending {
            return Vec::new();
        }
        self.retry_pending = false;
        self.connect(true)
    }

    /// Count the failure and either schedule the next attempt or give up.
    fn fail(&mut self, now: Instant, reason: String) -> Vec<Effect> {
        self.state = ConnectionState::Offline;
        self.attempts += 1;

        if self.attempts >= self.policy.max_attempts {
            self.stopped = true;
            self.error = Some(format!(
                "{reason}; automatic reconnect stopped after {} attempts",
                self.attempts
            ));
            return self.notify(
                now,
                NotifyKind::Stopped,
                Level::Warning,
                "Live updates stopped",
                "Reconnect manually to try again".to_string(),
            );
        }

        let delay = self.policy.delay_for(self.attempts);
        self.error = Some(reason);
        self.retry_pending = true;

        let mut effects = self.notify(
            now,
            NotifyKind::Reconnect,
            Level::Info,
            "Reconnecting live updates",
            format!(
                "attempt {} of {}, next try in {} ms",
                self.attempts,
                self.policy.max_attempts,
                delay.as_millis()
            ),
        );
        effects.push(Effect::ScheduleRetry(delay));
        effects
    }
}
