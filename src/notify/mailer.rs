//! The mailer actor.
//!
//! Actual e-mail delivery is an external concern; the mailer is where it plugs in. Today it
//! renders each notification into a structured log line per recipient.

use super::{Notification, NotificationEvent, Notifier};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Server half. Owns the receiving end of the notification channel.
pub struct Mailer {
    receiver: mpsc::UnboundedReceiver<Notification>,
    delivered: u64,
}

/// Client half. Sends never wait and never drop while the mailer runs.
///
/// Unbounded: one commit may release any number of notifications before the mailer gets
/// to run.
#[derive(Clone)]
pub struct MailerClient {
    sender: mpsc::UnboundedSender<Notification>,
}

impl Mailer {
    pub fn new() -> (Self, MailerClient) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                receiver,
                delivered: 0,
            },
            MailerClient { sender },
        )
    }

    /// Delivers notifications until every client is dropped. Returns the delivery count.
    pub async fn run(mut self) -> u64 {
        info!("Mailer started");
        while let Some(notification) = self.receiver.recv().await {
            let subject = subject(&notification.event);
            for recipient in &notification.recipients {
                info!(%recipient, subject = %subject, "Notification delivered");
                self.delivered += 1;
            }
        }
        info!(delivered = self.delivered, "Mailer shutdown");
        self.delivered
    }
}

impl Notifier for MailerClient {
    fn notify(&self, notification: Notification) {
        debug!(event = ?notification.event, "Queueing notification");
        if let Err(e) = self.sender.send(notification) {
            warn!(event = ?e.0.event, "Mailer is gone, notification dropped");
        }
    }
}

fn subject(event: &NotificationEvent) -> String {
    match event {
        NotificationEvent::PhaseAdvanced { draw, phase } => {
            format!("{draw} is now in {phase}")
        }
        NotificationEvent::GroupLocked { group } => format!("{group} has been locked"),
        NotificationEvent::NowSelecting { group, .. } => {
            format!("{group} may select a suite")
        }
        NotificationEvent::Skipped { group } => format!("{group} was skipped"),
        NotificationEvent::GroupDisbanded { group } => format!("{group} was disbanded"),
    }
}
