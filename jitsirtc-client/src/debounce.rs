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

//! Trailing-edge debounce on top of `tokio` timers.
//!
//! Every [`Debouncer::trigger`] call restarts the quiet period; the action runs
//! once, after the last trigger of a burst. The pending firing is cancelled
//! when the debouncer is dropped.

use std::sync::Mutex;
use std::time::Duration;

use jitsirtc_types::Callback;
use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::utils::lock;

pub struct Debouncer {
    delay: Duration,
    action: Callback<()>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration, action: impl Into<Callback<()>>) -> Self {
        Self {
            delay,
            action: action.into(),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the action, replacing any firing still pending.
    ///
    /// Outside a tokio runtime there is no timer to wait on, so the action
    /// runs immediately.
    pub fn trigger(&self) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no runtime for debounced action, firing now");
            self.action.emit(());
            return;
        };
        let action = self.action.clone();
        let delay = self.delay;
        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action.emit(());
        }));
    }

    pub fn cancel(&self) {
        if let Some(previous) = lock(&self.pending).take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
