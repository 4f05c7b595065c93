use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

/// Notification categories, each with its own cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotifyKind {
    Online,
    Offline,
    /// Automatic retries gave up.
    Stopped,
    Timeout,
    Error,
    Reconnect,
}

impl NotifyKind {
    pub fn cooldown(&self) -> Duration {
        let secs = match self {
            NotifyKind::Online => 12,
            NotifyKind::Offline => 20,
            NotifyKind::Stopped => 25,
            NotifyKind::Timeout => 20,
            NotifyKind::Error => 20,
            NotifyKind::Reconnect => 15,
        };
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub kind: NotifyKind,
    pub level: Level,
    pub title: String,
    pub text: String,
}

/// Per-kind rate limiter: a kind is admitted at most once per cooldown.
#[derive(Debug, Default)]
pub struct NotificationGate {
    last: HashMap<NotifyKind, Instant>,
}

impl NotificationGate {
    pub fn admit(&mut self, kind: NotifyKind, now: Instant) -> bool {
        match self.last.get(&kind) {
            Some(prev) if now.saturating_duration_since(*prev) < kind.cooldown() => false,
            _ => {
                self.last.insert(kind, now);
                true
            }
        }
    }
}
