//! Tokio-backed one-shot reminder scheduler.
//!
//! # Responsibility
//! - Register one deferred delivery per note id and cancel it on request.
//!
//! # Invariants
//! - Past-due reminders are never registered.
//! - At most one registration exists per note id; rescheduling replaces it.
//! - A fired task removes only its own registration (matched by token).
//! - Nothing is persisted; registrations live as long as the runtime.

use crate::clock::Clock;
use crate::model::note::NoteId;
use crate::reminder::delivery::ReminderDelivery;
use crate::reminder::notify::Notifier;
use crate::reminder::{Reminder, ReminderScheduler, ScheduleOutcome};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Registry = Arc<Mutex<HashMap<NoteId, PendingReminder>>>;

struct PendingReminder {
    token: u64,
    fire_at_ms: i64,
    handle: JoinHandle<()>,
}

/// Schedules reminders as sleeping tasks on a tokio runtime.
pub struct TokioReminderScheduler<N: Notifier + 'static> {
    runtime: Handle,
    clock: Arc<dyn Clock>,
    delivery: Arc<ReminderDelivery<N>>,
    registry: Registry,
    next_token: AtomicU64,
}

impl<N: Notifier + 'static> TokioReminderScheduler<N> {
    pub fn new(runtime: Handle, clock: Arc<dyn Clock>, notifier: N) -> Self {
        Self {
            runtime,
            clock,
            delivery: Arc::new(ReminderDelivery::new(notifier)),
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_token: AtomicU64::new(1),
        }
    }

    pub fn notifier(&self) -> &N {
        self.delivery.notifier()
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.registry).len()
    }

    pub fn is_pending(&self, note_id: NoteId) -> bool {
        lock(&self.registry).contains_key(&note_id)
    }

    /// Requested fire time of the registration for `note_id`, if any.
    pub fn pending_fire_time(&self, note_id: NoteId) -> Option<i64> {
        lock(&self.registry)
            .get(&note_id)
            .map(|pending| pending.fire_at_ms)
    }

    /// Cancels every registration; returns how many were removed.
    pub fn cancel_all(&self) -> usize {
        let mut registry = lock(&self.registry);
        let count = registry.len();
        for (_, pending) in registry.drain() {
            pending.handle.abort();
        }
        if count > 0 {
            info!("event=reminder_cancel_all module=reminder status=ok count={count}");
        }
        count
    }
}

impl<N: Notifier + 'static> ReminderScheduler for TokioReminderScheduler<N> {
    fn schedule(&self, reminder: Reminder) -> ScheduleOutcome {
        let now_ms = self.clock.now_ms();
        let delay_ms = reminder.fire_at_ms.saturating_sub(now_ms);
        if delay_ms <= 0 {
            debug!(
                "event=reminder_schedule module=reminder status=skipped note_id={} reason=past_due",
                reminder.note_id
            );
            return ScheduleOutcome::SkippedPastDue;
        }

        let note_id = reminder.note_id;
        let fire_at_ms = reminder.fire_at_ms;
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.registry);
        let delivery = Arc::clone(&self.delivery);
        let clock = Arc::clone(&self.clock);

        // Held across spawn so the task cannot look itself up before it is
        // registered.
        let mut pending = lock(&self.registry);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms.unsigned_abs())).await;
            if !take_registration(&registry, note_id, token) {
                return;
            }
            let _ = delivery.deliver(&reminder, clock.now_ms());
        });

        let replaced = pending.insert(
            note_id,
            PendingReminder {
                token,
                fire_at_ms,
                handle,
            },
        );
        if let Some(previous) = &replaced {
            previous.handle.abort();
        }
        info!(
            "event=reminder_schedule module=reminder status=ok note_id={note_id} delay_ms={delay_ms} replaced={}",
            replaced.is_some()
        );

        ScheduleOutcome::Scheduled
    }

    fn cancel(&self, note_id: NoteId) -> bool {
        let removed = lock(&self.registry).remove(&note_id);
        match removed {
            Some(pending) => {
                pending.handle.abort();
                info!("event=reminder_cancel module=reminder status=ok note_id={note_id}");
                true
            }
            None => false,
        }
    }
}

fn take_registration(registry: &Registry, note_id: NoteId, token: u64) -> bool {
    let mut pending = lock(registry);
    match pending.get(&note_id) {
        Some(entry) if entry.token == token => {
            pending.remove(&note_id);
            true
        }
        _ => false,
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<NoteId, PendingReminder>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
