//! Per-connection monitoring sessions.
//!
//! The manager owns the whole session table; the sampler's tick pass and the
//! per-connection command handlers serialize on the one mutex wrapping it, so
//! a tick never interleaves with a start/stop/query mid-mutation. Events leave
//! through each connection's outbox channel and are written to the socket by
//! that connection's writer task.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::types::{MonitoringReport, ServerEvent, Snapshot};

pub type ConnId = u64;

/// Capture state for one connection: `Idle` until `start`, then `Active`
/// until an explicit `stop` or the configured duration elapses.
struct Session {
    outbox: UnboundedSender<ServerEvent>,
    active: bool,
    samples: VecDeque<Snapshot>,
    started_at_ms: Option<i64>,
}

impl Session {
    fn new(outbox: UnboundedSender<ServerEvent>) -> Self {
        Self {
            outbox,
            active: false,
            samples: VecDeque::new(),
            started_at_ms: None,
        }
    }

    fn report(&self, end_time: Option<i64>, with_flag: bool) -> MonitoringReport {
        MonitoringReport {
            data: self.samples.iter().cloned().collect(),
            start_time: self.started_at_ms,
            end_time,
            data_points: self.samples.len(),
            is_monitoring: with_flag.then_some(self.active),
        }
    }

    fn send(&self, event: ServerEvent) {
        // A closed outbox just means the connection is tearing down.
        let _ = self.outbox.send(event);
    }
}

pub struct SessionManager {
    sessions: HashMap<ConnId, Session>,
    max_data_points: usize,
    duration_ms: i64,
}

impl SessionManager {
    pub fn new(max_data_points: usize, monitoring_duration_secs: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            max_data_points: max_data_points.max(1),
            duration_ms: (monitoring_duration_secs as i64).saturating_mul(1000),
        }
    }

    /// Register a fresh idle session for a newly connected client.
    pub fn connect(&mut self, id: ConnId, outbox: UnboundedSender<ServerEvent>) {
        debug!(conn = id, "session created");
        self.sessions.insert(id, Session::new(outbox));
    }

    /// Drop the session entirely. Safe to call for unknown ids.
    pub fn disconnect(&mut self, id: ConnId) {
        if self.sessions.remove(&id).is_some() {
            debug!(conn = id, "session destroyed");
        }
    }

    /// Begin capturing: clears the buffer and stamps a fresh start time.
    /// A start on an already-active session is a no-op so that repeated
    /// clicks cannot silently discard collected data.
    pub fn start(&mut self, id: ConnId, now_ms: i64) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if session.active {
            return;
        }
        session.active = true;
        session.samples.clear();
        session.started_at_ms = Some(now_ms);
        info!(conn = id, "monitoring started");
        session.send(ServerEvent::MonitoringStarted { start_time: now_ms });
    }

    /// Stop capturing and hand the collected window back to the client.
    /// No-op when idle.
    pub fn stop(&mut self, id: ConnId, now_ms: i64) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if !session.active {
            return;
        }
        session.active = false;
        info!(
            conn = id,
            data_points = session.samples.len(),
            "monitoring stopped"
        );
        let report = session.report(Some(now_ms), false);
        session.send(ServerEvent::MonitoringData(report));
    }

    /// Answer with the current window without touching any state.
    pub fn query(&self, id: ConnId, now_ms: i64) {
        let Some(session) = self.sessions.get(&id) else {
            return;
        };
        let end_time = session.active.then_some(now_ms);
        let report = session.report(end_time, true);
        session.send(ServerEvent::MonitoringData(report));
    }

    /// One tick with a valid snapshot: fan it out to every viewer, then feed
    /// each active session's sliding window and check for duration expiry.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot, now_ms: i64) {
        for session in self.sessions.values() {
            session.send(ServerEvent::SystemInfo(snapshot.clone()));
        }
        for (id, session) in self.sessions.iter_mut() {
            if !session.active {
                continue;
            }
            if session.samples.len() >= self.max_data_points {
                session.samples.pop_front();
            }
            session.samples.push_back(snapshot.clone());

            let expired = session
                .started_at_ms
                .is_some_and(|start| now_ms.saturating_sub(start) >= self.duration_ms);
            if expired {
                session.active = false;
                info!(
                    conn = *id,
                    data_points = session.samples.len(),
                    "monitoring window complete"
                );
                let report = session.report(Some(now_ms), false);
                session.send(ServerEvent::MonitoringComplete(report));
            }
        }
    }

    /// One tick where the probe failed: notify everyone, mutate nothing.
    pub fn on_probe_error(&self, message: &str) {
        for session in self.sessions.values() {
            session.send(ServerEvent::SystemError {
                message: message.to_string(),
            });
        }
    }

    #[cfg(test)]
    fn buffer_len(&self, id: ConnId) -> Option<usize> {
        self.sessions.get(&id).map(|s| s.samples.len())
    }

    #[cfg(test)]
    fn is_active(&self, id: ConnId) -> Option<bool> {
        self.sessions.get(&id).map(|s| s.active)
    }
}
