//! Transient, dismissible notifications

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

/// Cloneable handle for raising alerts, e.g. from call hooks
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: UnboundedSender<Alert>,
}

impl AlertSender {
    pub fn send(&self, alert: Alert) {
        // A closed center means the UI is gone; nothing left to show
        let _ = self.tx.send(alert);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(Alert::new(AlertKind::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(Alert::new(AlertKind::Error, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(Alert::new(AlertKind::Info, message));
    }
}

/// Receiving side, owned by the UI
#[derive(Debug)]
pub struct AlertCenter {
    rx: UnboundedReceiver<Alert>,
    active: Vec<Alert>,
}

pub fn channel() -> (AlertSender, AlertCenter) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        AlertSender { tx },
        AlertCenter {
            rx,
            active: Vec::new(),
        },
    )
}

impl AlertCenter {
    /// Move newly raised alerts into the active list; returns how many arrived
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        while let Ok(alert) = self.rx.try_recv() {
            self.active.push(alert);
            received += 1;
        }
        received
    }

    pub fn active(&self) -> &[Alert] {
        &self.active
    }

    /// Most recent alert
    pub fn current(&self) -> Option<&Alert> {
        self.active.last()
    }

    /// Most recent error alert, shown as a dialog
    pub fn current_error(&self) -> Option<&Alert> {
        self.active.iter().rev().find(|a| a.is_error())
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.id != id);
        self.active.len() != before
    }

    /// Drop non-error alerts older than `ttl`; errors wait for dismissal
    pub fn expire(&mut self, ttl: Duration) {
        self.expire_at(ttl, Utc::now());
    }

    fn expire_at(&mut self, ttl: Duration, now: DateTime<Utc>) {
        self.active.retain(|a| {
            a.is_error()
                || now
                    .signed_duration_since(a.raised_at)
                    .to_std()
                    .map_or(true, |age| age < ttl)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drain_collects_from_clones() {
        let (sender, mut center) = channel();
        let other = sender.clone();
        sender.success("Project created");
        other.error("Project already exists");
        assert_eq!(center.drain(), 2);
        assert_eq!(center.active().len(), 2);
        assert_eq!(
            center.current().map(|a| a.message.as_str()),
            Some("Project already exists")
        );
    }

    #[test]
    fn test_dismiss() {
        let (sender, mut center) = channel();
        sender.info("Refreshing");
        center.drain();
        let id = center.current().map(|a| a.id).unwrap();
        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
        assert!(center.current().is_none());
    }

    #[test]
    fn test_expire_keeps_errors() {
        let (sender, mut center) = channel();
        sender.success("Saved");
        sender.error("Failed");
        center.drain();
        let later = Utc::now() + ChronoDuration::seconds(10);
        center.expire_at(Duration::from_secs(5), later);
        assert_eq!(center.active().len(), 1);
        assert!(center.current_error().is_some());
    }

    #[test]
    fn test_send_after_center_dropped_is_silent() {
        let (sender, center) = channel();
        drop(center);
        sender.error("nobody listens");
    }
}
