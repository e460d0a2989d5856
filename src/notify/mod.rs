//! # Notifications
//!
//! Engine operations never deliver anything themselves. They push [`Notification`]s into the
//! command's effect buffer; the store hands the buffer to a [`Notifier`] only after the
//! command commits, so a rolled-back command never notifies anyone.
//!
//! [`Mailer`] is the production notifier: a small actor fed through a bounded channel.
//! [`RecordingNotifier`] keeps everything in memory for tests.

pub mod mailer;

pub use mailer::{Mailer, MailerClient};

use crate::model::{DrawId, GroupId, Phase, UserId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
    PhaseAdvanced { draw: DrawId, phase: Phase },
    GroupLocked { group: GroupId },
    /// The group's lottery unit may pick a suite now.
    NowSelecting { draw: DrawId, group: GroupId },
    Skipped { group: GroupId },
    GroupDisbanded { group: GroupId },
}

/// One message for a set of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event: NotificationEvent,
    pub recipients: Vec<UserId>,
}

impl Notification {
    pub fn new(event: NotificationEvent, recipients: Vec<UserId>) -> Self {
        Self { event, recipients }
    }
}

/// Effects buffer of one command.
pub type Outbox = Vec<Notification>;

/// Fire-and-forget delivery of committed notifications.
///
/// Implementations must not block: they are called from inside the store actor's loop.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Notifier that keeps every notification it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Received events, in order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.sent().into_iter().map(|n| n.event).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}
