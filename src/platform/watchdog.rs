use crate::traits::Watchdog;
use esp_idf_svc::hal::task::watchdog::WatchdogSubscription;
use log::warn;

/// Task watchdog subscription for the bridge loop's task.
pub struct TaskWatchdog<'a> {
    subscription: WatchdogSubscription<'a>,
}

impl<'a> TaskWatchdog<'a> {
    pub fn new(subscription: WatchdogSubscription<'a>) -> Self {
        Self { subscription }
    }
}

impl Watchdog for TaskWatchdog<'_> {
    fn feed(&mut self) {
        if let Err(e) = self.subscription.feed() {
            warn!("Failed to feed task watchdog: {:?}", e);
        }
    }
}
