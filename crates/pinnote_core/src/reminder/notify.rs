//! Host notification facility contract.
//!
//! # Responsibility
//! - Describe the channel and notification shapes posted on reminder fire.
//! - Provide an in-process queue implementation a host can drain.
//!
//! # Invariants
//! - `ensure_channel` is idempotent on every implementation.
//! - Implementations never log note text.

use crate::model::note::NoteId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

pub const REMINDER_CHANNEL_ID: &str = "reminder_channel";
const REMINDER_CHANNEL_NAME: &str = "Reminder Notifications";
const REMINDER_CHANNEL_DESCRIPTION: &str = "Reminder notifications";
const LIGHT_BLUE: u32 = 0xFF00_00FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSound {
    Silent,
    SystemDefault,
}

/// Notification channel (category) registered with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub lights: bool,
    pub light_color: u32,
    pub vibration: bool,
}

impl NotificationChannel {
    /// High-importance channel used for reminder notifications.
    pub fn reminders() -> Self {
        Self {
            id: REMINDER_CHANNEL_ID.to_string(),
            name: REMINDER_CHANNEL_NAME.to_string(),
            description: REMINDER_CHANNEL_DESCRIPTION.to_string(),
            importance: Importance::High,
            lights: true,
            light_color: LIGHT_BLUE,
            vibration: true,
        }
    }
}

/// User-visible notification posted when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique per posted notification within the process.
    pub id: i32,
    pub channel_id: String,
    pub note_id: NoteId,
    pub title: String,
    pub body: String,
    pub importance: Importance,
    pub sound: NotificationSound,
    /// Dismiss when the user taps it.
    pub auto_cancel: bool,
    /// Epoch milliseconds at which the reminder fired.
    pub posted_at: i64,
}

/// Host notification failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl Error for NotifyError {}

/// Host facility that displays notifications.
pub trait Notifier: Send + Sync {
    fn ensure_channel(&self, channel: &NotificationChannel) -> Result<(), NotifyError>;
    fn post(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn ensure_channel(&self, channel: &NotificationChannel) -> Result<(), NotifyError> {
        (**self).ensure_channel(channel)
    }

    fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).post(notification)
    }
}

/// Buffers posted notifications until the host drains them.
#[derive(Debug, Default)]
pub struct QueueNotifier {
    channels: Mutex<HashMap<String, NotificationChannel>>,
    posted: Mutex<VecDeque<Notification>>,
}

impl QueueNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every buffered notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let mut posted = self.posted.lock().unwrap_or_else(PoisonError::into_inner);
        posted.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, id: &str) -> Option<NotificationChannel> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl Notifier for QueueNotifier {
    fn ensure_channel(&self, channel: &NotificationChannel) -> Result<(), NotifyError> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if !channels.contains_key(&channel.id) {
            debug!(
                "event=notification_channel module=reminder status=ok channel_id={}",
                channel.id
            );
            channels.insert(channel.id.clone(), channel.clone());
        }
        Ok(())
    }

    fn post(&self, notification: &Notification) -> Result<(), NotifyError> {
        let known = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&notification.channel_id);
        if !known {
            return Err(NotifyError::new(format!(
                "channel `{}` is not registered",
                notification.channel_id
            )));
        }
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notification.clone());
        Ok(())
    }
}
