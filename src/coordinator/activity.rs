//! Activity notifier
//!
//! Single-slot broadcast of what the coordinator is doing. Subscribers only
//! ever see the latest value. Clearing back to idle happens after a display
//! delay so an observer can keep the last agent lit briefly.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Activity;

/// How long the last activity stays visible after a cycle ends
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Publishes the current `Activity` to any number of observers
#[derive(Debug)]
pub struct ActivityNotifier {
    tx: Arc<watch::Sender<Activity>>,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
}

impl ActivityNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Activity::Idle);
        Self {
            tx: Arc::new(tx),
            pending_reset: Mutex::new(None),
        }
    }

    /// Overwrite the published activity. Cancels any pending delayed reset.
    pub fn set(&self, activity: Activity) {
        self.cancel_pending_reset();
        debug!("Activity -> {}", activity);
        self.tx.send_replace(activity);
    }

    /// Latest published value
    pub fn current(&self) -> Activity {
        *self.tx.borrow()
    }

    /// Get a receiver that observes every overwrite
    pub fn subscribe(&self) -> watch::Receiver<Activity> {
        self.tx.subscribe()
    }

    /// Publish `Idle` once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime when `delay` is non-zero.
    pub fn reset_after(&self, delay: Duration) {
        self.cancel_pending_reset();

        if delay.is_zero() {
            self.tx.send_replace(Activity::Idle);
            return;
        }

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Activity -> idle after {:?}", delay);
            tx.send_replace(Activity::Idle);
        });
        *self.lock_pending() = Some(handle);
    }

    fn cancel_pending_reset(&self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_reset.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ActivityNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Agent;

    #[test]
    fn test_starts_idle() {
        let notifier = ActivityNotifier::new();
        assert_eq!(notifier.current(), Activity::Idle);
    }

    #[test]
    fn test_set_overwrites() {
        let notifier = ActivityNotifier::new();
        notifier.set(Activity::Coordinating);
        notifier.set(Activity::Tool(Agent::MedicalRecords));
        assert_eq!(notifier.current(), Activity::Tool(Agent::MedicalRecords));
    }

    #[test]
    fn test_subscriber_sees_latest_only() {
        let notifier = ActivityNotifier::new();
        let rx = notifier.subscribe();
        notifier.set(Activity::Coordinating);
        notifier.set(Activity::Tool(Agent::BillingAndPayments));
        assert_eq!(*rx.borrow(), Activity::Tool(Agent::BillingAndPayments));
    }

    #[test]
    fn test_zero_delay_resets_immediately() {
        let notifier = ActivityNotifier::new();
        notifier.set(Activity::Tool(Agent::PatientManagement));
        notifier.reset_after(Duration::ZERO);
        assert_eq!(notifier.current(), Activity::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_delay() {
        let notifier = ActivityNotifier::new();
        notifier.set(Activity::Tool(Agent::AppointmentScheduler));
        notifier.reset_after(DEFAULT_RESET_DELAY);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(notifier.current(), Activity::Tool(Agent::AppointmentScheduler));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(notifier.current(), Activity::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_cancels_pending_reset() {
        let notifier = ActivityNotifier::new();
        notifier.set(Activity::Tool(Agent::AppointmentScheduler));
        notifier.reset_after(DEFAULT_RESET_DELAY);

        tokio::time::sleep(Duration::from_millis(500)).await;
        notifier.set(Activity::Coordinating);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(notifier.current(), Activity::Coordinating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_notified_of_reset() {
        let notifier = ActivityNotifier::new();
        let mut rx = notifier.subscribe();
        notifier.set(Activity::Tool(Agent::MedicalRecords));
        rx.borrow_and_update();

        notifier.reset_after(Duration::from_millis(100));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Activity::Idle);
    }
}
