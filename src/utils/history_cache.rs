use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::backend::{BackendClient, BackendError};
use crate::model::attendance::AttendanceRecord;
use crate::model::live::LiveMessage;

/// Short-lived copy of the recent attendance history, keyed by fetch limit.
#[derive(Clone)]
pub struct HistoryCache {
    inner: Cache<u32, Arc<Vec<AttendanceRecord>>>,
    limit: u32,
}

impl HistoryCache {
    pub fn new(limit: u32, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(8).time_to_live(ttl).build(),
            limit,
        }
    }

    /// Cached history, fetched from the backend on a miss.
    pub async fn recent(&self, backend: &BackendClient) -> Result<Arc<Vec<AttendanceRecord>>, BackendError> {
        if let Some(hit) = self.inner.get(&self.limit).await {
            return Ok(hit);
        }
        self.refresh(backend).await
    }

    /// Always goes to the backend and replaces the cached copy.
    pub async fn refresh(&self, backend: &BackendClient) -> Result<Arc<Vec<AttendanceRecord>>, BackendError> {
        let fresh = Arc::new(backend.list_attendance(self.limit).await?);
        self.inner.insert(self.limit, fresh.clone()).await;
        Ok(fresh)
    }

    pub async fn invalidate(&self) {
        self.inner.invalidate(&self.limit).await;
    }

    #[cfg(test)]
    pub async fn prime(&self, records: Vec<AttendanceRecord>) {
        self.inner.insert(self.limit, Arc::new(records)).await;
    }

    #[cfg(test)]
    pub async fn is_cached(&self) -> bool {
        self.inner.get(&self.limit).await.is_some()
    }
}

/// Drop the cached history whenever the attendance channel reports a
/// recorded clock-in. Runs until the sender side is gone.
pub async fn invalidate_on_events(cache: HistoryCache, mut events: UnboundedReceiver<LiveMessage>) {
    while let Some(msg) = events.recv().await {
        if let LiveMessage::Attendance(ev) = &msg {
            if let Some(action) = ev.recorded_action() {
                cache.invalidate().await;
                info!(
                    name = ev.name.as_deref().unwrap_or("-"),
                    %action,
                    "Attendance recorded upstream, history cache invalidated"
                );
            }
        }
    }
}
