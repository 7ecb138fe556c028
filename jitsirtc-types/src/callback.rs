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

//! Thread-safe callback type.
//!
//! Event handlers and timers in the client run on tokio tasks, so unlike a UI
//! framework callback this one is `Send + Sync` and backed by an `Arc`.

use std::sync::Arc;

/// Cloneable callback wrapper.
pub struct Callback<IN, OUT = ()> {
    cb: Arc<dyn Fn(IN) -> OUT + Send + Sync>,
}

impl<IN, OUT, F: Fn(IN) -> OUT + Send + Sync + 'static> From<F> for Callback<IN, OUT> {
    fn from(func: F) -> Self {
        Callback { cb: Arc::new(func) }
    }
}

impl<IN, OUT> Clone for Callback<IN, OUT> {
    fn clone(&self) -> Self {
        Self {
            cb: self.cb.clone(),
        }
    }
}

impl<IN, OUT> Callback<IN, OUT> {
    pub fn emit(&self, value: IN) -> OUT {
        (*self.cb)(value)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_callback_emits_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb = Callback::from(move |v: u32| sink.lock().unwrap().push(v));
        cb.emit(1);
        cb.clone().emit(2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_callback_is_send_across_threads() {
        let cb = Callback::from(|v: u8| v + 1);
        let handle = std::thread::spawn(move || cb.emit(41));
        assert_eq!(handle.join().unwrap(), 42);
    }
}
