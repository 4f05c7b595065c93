//! Resilient clients for the backend's WebSocket channels.
//!
//! [`state`] holds the reconnect rules, [`client`] runs them against a real
//! socket, and [`LiveHub`] owns one client per [`Topic`].

pub mod client;
pub mod notify;
pub mod state;

use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;

use crate::live::client::{LiveHandle, LiveSnapshot};
use crate::live::state::RetryPolicy;
use crate::model::live::{LiveMessage, Topic};

#[derive(Clone, Default)]
pub struct LiveHub {
    clients: Vec<LiveHandle>,
}

impl LiveHub {
    /// One client per topic. Attendance messages are also forwarded to
    /// `attendance_sink`.
    pub fn start(ws_base: &str, policy: &RetryPolicy, attendance_sink: UnboundedSender<LiveMessage>) -> Self {
        let clients = Topic::iter()
            .map(|topic| {
                let sink = (topic == Topic::Attendance).then(|| attendance_sink.clone());
                client::spawn(topic, ws_base, policy.clone(), sink)
            })
            .collect();
        Self::from_handles(clients)
    }

    pub fn from_handles(clients: Vec<LiveHandle>) -> Self {
        Self { clients }
    }

    pub fn get(&self, topic: Topic) -> Option<&LiveHandle> {
        self.clients.iter().find(|c| c.topic() == topic)
    }

    pub fn snapshots(&self) -> Vec<LiveSnapshot> {
        self.clients.iter().map(LiveHandle::snapshot).collect()
    }

    pub fn shutdown(&self) {
        for client in &self.clients {
            client.shutdown();
        }
    }
}
