//! Fire-time delivery of a reminder as a notification.
//!
//! # Invariants
//! - The reminder channel is registered at most once per delivery instance
//!   (retried on the next fire if registration failed).
//! - Notification ids are derived from the fire time and strictly increase,
//!   so reminders firing in the same millisecond do not collide.

use crate::reminder::notify::{
    Importance, Notification, NotificationChannel, NotificationSound, Notifier, NotifyError,
    REMINDER_CHANNEL_ID,
};
use crate::reminder::Reminder;
use log::{error, info};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicI64, Ordering};

const FALLBACK_TITLE: &str = "Reminder";
const FALLBACK_BODY: &str = "You have a reminder!";

/// Posts fired reminders through a host `Notifier`.
pub struct ReminderDelivery<N: Notifier> {
    notifier: N,
    channel_ready: OnceCell<()>,
    last_id: AtomicI64,
}

impl<N: Notifier> ReminderDelivery<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            channel_ready: OnceCell::new(),
            last_id: AtomicI64::new(i64::MIN),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Ensures the channel exists, then posts the reminder notification.
    ///
    /// Returns the posted notification.
    pub fn deliver(
        &self,
        reminder: &Reminder,
        fired_at_ms: i64,
    ) -> Result<Notification, NotifyError> {
        self.channel_ready
            .get_or_try_init(|| self.notifier.ensure_channel(&NotificationChannel::reminders()))
            .map_err(|err| {
                error!(
                    "event=reminder_deliver module=reminder status=error note_id={} error_code=channel_failed error={}",
                    reminder.note_id, err
                );
                err
            })?;

        let notification = Notification {
            id: self.next_id(fired_at_ms),
            channel_id: REMINDER_CHANNEL_ID.to_string(),
            note_id: reminder.note_id,
            title: non_blank_or(&reminder.title, FALLBACK_TITLE),
            body: non_blank_or(&reminder.description, FALLBACK_BODY),
            importance: Importance::High,
            sound: NotificationSound::SystemDefault,
            auto_cancel: true,
            posted_at: fired_at_ms,
        };

        match self.notifier.post(&notification) {
            Ok(()) => {
                info!(
                    "event=reminder_deliver module=reminder status=ok note_id={} notification_id={}",
                    reminder.note_id, notification.id
                );
                Ok(notification)
            }
            Err(err) => {
                error!(
                    "event=reminder_deliver module=reminder status=error note_id={} error_code=post_failed error={}",
                    reminder.note_id, err
                );
                Err(err)
            }
        }
    }

    fn next_id(&self, fired_at_ms: i64) -> i32 {
        let mut previous = self.last_id.load(Ordering::Relaxed);
        loop {
            let candidate = fired_at_ms.max(previous.saturating_add(1));
            match self.last_id.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return truncate_id(candidate),
                Err(actual) => previous = actual,
            }
        }
    }
}

// Host notification ids are 32-bit; only the low bits of the millisecond
// value are kept.
fn truncate_id(value: i64) -> i32 {
    value as i32
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
