use std::collections::VecDeque;
use std::time::{Duration, Instant};

use actix_web::rt::{self, task::JoinHandle};
use awc::ws::{Frame, Message};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::live::notify::Notification;
use crate::live::state::{ConnId, Effect, LiveState, LiveStatus, RetryPolicy};
use crate::model::live::{LiveMessage, Topic};

/// Entries kept per feed.
pub const FEED_CAPACITY: usize = 50;

const MAX_FRAME_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, Serialize)]
pub struct Stamped<T> {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub item: T,
}

/// What HTTP handlers see of a live client. Feeds are newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveSnapshot {
    pub topic: Topic,
    pub url: String,
    pub status: LiveStatus,
    #[schema(value_type = Vec<Object>)]
    pub messages: VecDeque<Stamped<LiveMessage>>,
    #[schema(value_type = Vec<Object>)]
    pub notifications: VecDeque<Stamped<Notification>>,
}

impl LiveSnapshot {
    fn new(topic: Topic, url: String, status: LiveStatus) -> Self {
        Self {
            topic,
            url,
            status,
            messages: VecDeque::with_capacity(FEED_CAPACITY),
            notifications: VecDeque::with_capacity(FEED_CAPACITY),
        }
    }
}

fn push_bounded<T>(feed: &mut VecDeque<Stamped<T>>, item: T) {
    feed.push_front(Stamped { at: Utc::now(), item });
    feed.truncate(FEED_CAPACITY);
}

#[derive(Debug)]
pub(crate) enum Command {
    Reconnect,
    Shutdown,
}

#[derive(Debug)]
enum SocketEvent {
    Opened,
    Text(String),
    Failed(String),
    Closed,
}

#[derive(Debug)]
enum Event {
    Socket(ConnId, SocketEvent),
    OpenTimeout(ConnId),
    RetryDue,
}

/// Cheap, cloneable access to a running live client.
#[derive(Clone)]
pub struct LiveHandle {
    topic: Topic,
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<LiveSnapshot>,
}

impl LiveHandle {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn reconnect(&self) -> anyhow::Result<()> {
        self.commands
            .send(Command::Reconnect)
            .map_err(|_| anyhow::anyhow!("live client for {} is not running", self.topic))
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// A handle with no task behind it. The returned receiver keeps the
    /// command channel open.
    #[cfg(test)]
    pub(crate) fn detached(topic: Topic, url: &str) -> (Self, mpsc::UnboundedReceiver<Command>) {
        let state = LiveState::new(topic, RetryPolicy::default());
        let (_snapshot_tx, snapshot) = watch::channel(LiveSnapshot::new(topic, url.to_string(), state.status()));
        let (commands, rx) = mpsc::unbounded_channel();
        (
            Self {
                topic,
                commands,
                snapshot,
            },
            rx,
        )
    }
}

/// Start a client for `topic` on the current actix runtime.
///
/// Accepted messages are kept in the snapshot and, when `sink` is given,
/// forwarded to it.
pub fn spawn(
    topic: Topic,
    ws_base: &str,
    policy: RetryPolicy,
    sink: Option<mpsc::UnboundedSender<LiveMessage>>,
) -> LiveHandle {
    let url = format!("{}{}", ws_base.trim_end_matches('/'), topic.path());
    // awc's own timeout must not beat the open timeout
    let connect_timeout = policy.open_timeout + Duration::from_secs(2);
    let state = LiveState::new(topic, policy);
    let feed = LiveSnapshot::new(topic, url.clone(), state.status());

    let (snapshot_tx, snapshot_rx) = watch::channel(feed.clone());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let driver = Driver {
        url,
        connect_timeout,
        state,
        events: event_tx,
        socket: None,
        open_timer: None,
        retry_timer: None,
        feed,
        snapshot: snapshot_tx,
        sink,
    };
    rt::spawn(driver.run(cmd_rx, event_rx));

    LiveHandle {
        topic,
        commands: cmd_tx,
        snapshot: snapshot_rx,
    }
}

/// Owns the socket task, the timers and the state machine of one topic.
struct Driver {
    url: String,
    connect_timeout: Duration,
    state: LiveState,
    events: mpsc::UnboundedSender<Event>,
    socket: Option<(ConnId, oneshot::Sender<()>)>,
    open_timer: Option<JoinHandle<()>>,
    retry_timer: Option<JoinHandle<()>>,
    feed: LiveSnapshot,
    snapshot: watch::Sender<LiveSnapshot>,
    sink: Option<mpsc::UnboundedSender<LiveMessage>>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        let topic = self.state.topic();
        info!(%topic, url = %self.url, "Live client starting");
        let effects = self.state.connect(false);
        self.apply(effects);
        self.publish();

        loop {
            let effects = tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Reconnect) => {
                        info!(%topic, "Manual reconnect requested");
                        self.state.reconnect()
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = events.recv() => self.handle(event),
            };
            self.apply(effects);
            self.publish();
        }

        let effects = self.state.disconnect();
        self.apply(effects);
        self.release_timers();
        self.publish();
        info!(%topic, "Live client stopped");
    }

    fn handle(&mut self, event: Event) -> Vec<Effect> {
        let now = Instant::now();
        let before = self.state.status().state;
        let effects = match event {
            Event::Socket(id, SocketEvent::Opened) => self.state.on_open(id, now),
            Event::Socket(id, SocketEvent::Text(raw)) => self.state.on_message(id, &raw),
            Event::Socket(id, SocketEvent::Failed(detail)) => self.state.on_error(id, &detail, now),
            Event::Socket(id, SocketEvent::Closed) => {
                if matches!(&self.socket, Some((owned, _)) if *owned == id) {
                    self.socket = None;
                }
                self.state.on_close(id, now)
            }
            Event::OpenTimeout(id) => self.state.on_open_timeout(id, now),
            Event::RetryDue => {
                self.retry_timer = None;
                self.state.on_retry_due()
            }
        };

        let status = self.state.status();
        if status.state != before {
            info!(
                topic = %self.state.topic(),
                connection_id = status.connection_id,
                from = %before,
                to = %status.state,
                attempts = status.attempts,
                error = status.error.as_deref().unwrap_or(""),
                "Live state changed"
            );
        }
        effects
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Open(id) => {
                    let (stop_tx, stop_rx) = oneshot::channel();
                    // replacing the sender stops any previous socket task
                    self.socket = Some((id, stop_tx));
                    rt::spawn(run_socket(
                        self.url.clone(),
                        id,
                        self.connect_timeout,
                        self.events.clone(),
                        stop_rx,
                    ));
                }
                Effect::ArmOpenTimeout(id, after) => {
                    let events = self.events.clone();
                    let timer = rt::spawn(async move {
                        rt::time::sleep(after).await;
                        let _ = events.send(Event::OpenTimeout(id));
                    });
                    if let Some(old) = self.open_timer.replace(timer) {
                        old.abort();
                    }
                }
                Effect::Close(id) => {
                    if matches!(&self.socket, Some((owned, _)) if *owned == id) {
                        if let Some((_, stop)) = self.socket.take() {
                            let _ = stop.send(());
                        }
                    }
                }
                Effect::ScheduleRetry(delay) => {
                    debug!(topic = %self.state.topic(), ?delay, "Retry scheduled");
                    let events = self.events.clone();
                    let timer = rt::spawn(async move {
                        rt::time::sleep(delay).await;
                        let _ = events.send(Event::RetryDue);
                    });
                    if let Some(old) = self.retry_timer.replace(timer) {
                        old.abort();
                    }
                }
                Effect::CancelRetry => {
                    if let Some(timer) = self.retry_timer.take() {
                        timer.abort();
                    }
                }
                Effect::Notify(note) => {
                    info!(
                        topic = %self.state.topic(),
                        connection_id = self.state.status().connection_id,
                        kind = %note.kind,
                        level = %note.level,
                        "{}: {}",
                        note.title,
                        note.text
                    );
                    push_bounded(&mut self.feed.notifications, note);
                }
                Effect::Deliver(msg) => {
                    if let Some(sink) = &self.sink {
                        if sink.send(msg.clone()).is_err() {
                            warn!(topic = %self.state.topic(), "Live message consumer is gone");
                            self.sink = None;
                        }
                    }
                    push_bounded(&mut self.feed.messages, msg);
                }
            }
        }
    }

    fn release_timers(&mut self) {
        if let Some(timer) = self.open_timer.take() {
            timer.abort();
        }
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
        if let Some((_, stop)) = self.socket.take() {
            let _ = stop.send(());
        }
    }

    fn publish(&mut self) {
        self.feed.status = self.state.status();
        self.snapshot.send_replace(self.feed.clone());
    }
}

/// Client for both `ws://` and `wss://` (rustls with webpki roots).
fn ws_client(connect_timeout: Duration) -> awc::Client {
    awc::Client::builder().timeout(connect_timeout).finish()
}

/// One WebSocket connection. Reports through `events` tagged with `id`
/// and stops when `stop` fires or its sender is dropped.
async fn run_socket(
    url: String,
    id: ConnId,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<Event>,
    mut stop: oneshot::Receiver<()>,
) {
    let report = |event: SocketEvent| {
        let _ = events.send(Event::Socket(id, event));
    };

    let client = ws_client(connect_timeout);
    let connecting = client.ws(url.as_str()).max_frame_size(MAX_FRAME_SIZE).connect();

    let mut framed = tokio::select! {
        _ = &mut stop => return,
        res = connecting => match res {
            Ok((_resp, framed)) => framed,
            Err(err) => {
                debug!(%url, connection_id = id, error = %err, "WebSocket connect failed");
                report(SocketEvent::Failed(err.to_string()));
                report(SocketEvent::Closed);
                return;
            }
        },
    };
    report(SocketEvent::Opened);

    loop {
        tokio::select! {
            _ = &mut stop => {
                let _ = framed.send(Message::Close(None)).await;
                break;
            }
            frame = framed.next() => match frame {
                Some(Ok(Frame::Text(bytes))) => {
                    report(SocketEvent::Text(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(Ok(Frame::Ping(bytes))) => {
                    if framed.send(Message::Pong(bytes)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Frame::Close(reason))) => {
                    debug!(connection_id = id, ?reason, "Server closed the socket");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    report(SocketEvent::Failed(err.to_string()));
                    break;
                }
                None => break,
            },
        }
    }
    report(SocketEvent::Closed);
}
