//! Append-only event log with live fan-out

use std::sync::Arc;

use antsreview_types::{Clock, SystemClock, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::ProtocolEvent;

/// Capacity of the live broadcast channel
pub const DEFAULT_EVENT_BUFFER: usize = 1000;

/// An event together with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Monotonic position, starting at 0
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: ProtocolEvent,
}

/// Append-only log of every committed protocol mutation.
///
/// Cheap to share: wrap it in an `Arc` and hand it to the registry and the
/// engine.
pub struct EventLog {
    records: RwLock<Vec<RecordedEvent>>,
    sender: broadcast::Sender<RecordedEvent>,
    clock: Arc<dyn Clock>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_EVENT_BUFFER, Arc::new(SystemClock))
    }

    /// Create a log with a specific broadcast capacity and time source
    pub fn with_clock(buffer: usize, clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self {
            records: RwLock::new(Vec::new()),
            sender,
            clock,
        }
    }

    /// Append an event and broadcast it to live subscribers
    pub async fn record(&self, event: ProtocolEvent) -> RecordedEvent {
        let mut records = self.records.write().await;
        let recorded = RecordedEvent {
            sequence: records.len() as u64,
            recorded_at: self.clock.now(),
            event,
        };
        records.push(recorded.clone());
        debug!(sequence = recorded.sequence, event = recorded.event.name(), "event recorded");

        // Ignore send errors (no receivers)
        let _ = self.sender.send(recorded.clone());
        recorded
    }

    /// Subscribe to events recorded from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RecordedEvent> {
        self.sender.subscribe()
    }

    /// Every event with `sequence >= from`, in order
    pub async fn since(&self, from: u64) -> Vec<RecordedEvent> {
        let records = self.records.read().await;
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(records.len());
        records[start..].to_vec()
    }

    /// Every event concerning one task, in order
    pub async fn for_task(&self, task_id: TaskId) -> Vec<RecordedEvent> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.event.task_id() == Some(task_id))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Most recent event, if any
    pub async fn last(&self) -> Option<RecordedEvent> {
        self.records.read().await.last().cloned()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antsreview_types::{Address, ManualClock};

    fn paused(account: &str) -> ProtocolEvent {
        ProtocolEvent::Paused {
            account: Address::from(account),
        }
    }

    #[tokio::test]
    async fn test_sequences_are_monotonic() {
        let log = EventLog::new();
        let first = log.record(paused("a")).await;
        let second = log.record(paused("b")).await;

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn test_replay_from_arbitrary_point() {
        let log = EventLog::new();
        for name in ["a", "b", "c"] {
            log.record(paused(name)).await;
        }

        let tail = log.since(1).await;
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 1);

        assert!(log.since(10).await.is_empty());
        assert_eq!(log.since(0).await.len(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_receive_live_events() {
        let log = EventLog::new();
        let mut rx = log.subscribe();

        log.record(paused("owner")).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, paused("owner"));
    }

    #[tokio::test]
    async fn test_recorded_at_uses_injected_clock() {
        let clock = ManualClock::starting_now();
        let log = EventLog::with_clock(16, Arc::new(clock.clone()));

        let recorded = log.record(paused("owner")).await;
        assert_eq!(recorded.recorded_at, clock.now());
    }
}
