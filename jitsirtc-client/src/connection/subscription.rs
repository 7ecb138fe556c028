/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use log::debug;
use tokio::task::JoinHandle;

/// Handle on a running event pump.
///
/// The pump owns every event receiver it listens on, so stopping the task
/// drops them all at once. Dropping the subscription stops it.
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the pump now. Returns false when it was already stopped.
    pub fn unsubscribe(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                debug!("Unsubscribing from library events");
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drop_stops_the_pump() {
        let (tx, mut rx) = async_broadcast::broadcast::<u32>(4);
        let task = tokio::spawn(async move { while rx.recv().await.is_ok() {} });
        let subscription = Subscription::new(task);
        assert!(subscription.is_active());

        drop(subscription);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(tx.receiver_count(), 0, "receiver should be dropped with the task");
    }

    #[tokio::test]
    async fn unsubscribe_twice_is_harmless() {
        let mut subscription = Subscription::new(tokio::spawn(async {}));
        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
    }
}
